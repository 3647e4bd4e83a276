//! Probe every plausible slave address on one I2C bus.
//!
//! Usage: `probe_bus <bus>` — e.g. `probe_bus 2` for /dev/i2c-2.

use pex_driver::{probe_addresses, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("pex_driver=debug")
        .init();

    let bus: u8 = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(2);

    let found = probe_addresses(bus, &pex_driver::default_addresses())?;

    for d in &found {
        println!(
            "Found {}-{:02X} at {}-{:04x}",
            d.family.name, d.revision, d.bus, d.address
        );
    }
    println!("{} device(s) on bus {bus}", found.len());

    Ok(())
}
