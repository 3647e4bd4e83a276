//! Dump one port's 4 KB register space as hex words.
//!
//! Usage: `dump_port <bus> <addr> <stn> <port>` — e.g. `dump_port 2 0x38 0 0`.

use pex_chip::{regs, Mode};
use pex_driver::{PexDevice, Result};

/// Decimal, or hex with an explicit 0x prefix — like strtol(.., 0).
fn arg(n: usize, default: u8) -> u8 {
    std::env::args()
        .nth(n)
        .and_then(|a| match a.strip_prefix("0x").or_else(|| a.strip_prefix("0X")) {
            Some(hex) => u8::from_str_radix(hex, 16).ok(),
            None => a.parse().ok(),
        })
        .unwrap_or(default)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("pex_driver=info")
        .init();

    let bus = arg(1, 2);
    let address = arg(2, 0x38);
    let station = arg(3, 0);
    let port = arg(4, 0);

    let mut dev = PexDevice::open(bus, address)?;

    for offset in (0..regs::REG_SPACE_SIZE).step_by(4) {
        // Stop at the first register the chip refuses to answer.
        let Ok(value) = dev.read(station, port, Mode::Transparent, offset) else {
            break;
        };
        println!("{offset:03x}: {value:08x}");
    }

    dev.close();
    Ok(())
}
