//! `pex` — command-line interface for PEX87xx switches on I2C.
//!
//! ```text
//! USAGE:
//!   pex probe <bus>                                  Scan a bus for known chips
//!   pex read <bus> <dev> <stn> <port> <mode> <reg>   Read one register
//!   pex write <bus> <dev> <stn> <port> <mode> <reg> <value>
//!   pex dump <bus> <dev> <stn> <port> <mode>         Dump a port's 4 KB space
//!   pex status <bus> <dev>                           Identity and port states
//! ```
//!
//! Numeric arguments accept decimal or `0x`-prefixed hex.

use std::io::Write as _;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pex_chip::{regs, Mode};
use pex_driver::PexDevice;

#[derive(Parser)]
#[command(name = "pex", about = "PEX87xx I2C management CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Scan a bus for known PEX87xx chips.
    Probe {
        /// I2C bus index (as in /dev/i2c-N).
        #[arg(value_parser = num_u8)]
        bus: u8,
        /// Restrict the scan to these slave addresses.
        #[arg(long, value_parser = num_u8)]
        address: Vec<u8>,
    },
    /// Read one register and print it as hex.
    Read {
        #[arg(value_parser = num_u8)]
        bus: u8,
        /// 7-bit slave address.
        #[arg(value_parser = num_u8)]
        dev: u8,
        #[arg(value_parser = num_u8)]
        stn: u8,
        #[arg(value_parser = num_u8)]
        port: u8,
        /// Register space: 0 transparent, 1 NT-link, 2 NT-virtual, 3 DMA.
        #[arg(value_parser = num_u8)]
        mode: u8,
        #[arg(value_parser = num_u32)]
        reg: u32,
    },
    /// Write one register.
    Write {
        #[arg(value_parser = num_u8)]
        bus: u8,
        #[arg(value_parser = num_u8)]
        dev: u8,
        #[arg(value_parser = num_u8)]
        stn: u8,
        #[arg(value_parser = num_u8)]
        port: u8,
        #[arg(value_parser = num_u8)]
        mode: u8,
        #[arg(value_parser = num_u32)]
        reg: u32,
        #[arg(value_parser = num_u32)]
        value: u32,
    },
    /// Dump a port's full register space.
    Dump {
        #[arg(value_parser = num_u8)]
        bus: u8,
        #[arg(value_parser = num_u8)]
        dev: u8,
        #[arg(value_parser = num_u8)]
        stn: u8,
        #[arg(value_parser = num_u8)]
        port: u8,
        #[arg(value_parser = num_u8)]
        mode: u8,
        /// Emit raw native-endian words to stdout instead of hex lines.
        #[arg(long)]
        raw: bool,
    },
    /// Print identity, enabled ports, and per-port link state.
    Status {
        #[arg(value_parser = num_u8)]
        bus: u8,
        #[arg(value_parser = num_u8)]
        dev: u8,
    },
}

/// Parse decimal or 0x-prefixed hex, like strtol(.., 0).
fn num_u32(s: &str) -> Result<u32, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("{s}: {e}"))
}

fn num_u8(s: &str) -> Result<u8, String> {
    let v = num_u32(s)?;
    u8::try_from(v).map_err(|_| format!("{s}: exceeds 8 bits"))
}

fn parse_mode(raw: u8) -> Result<Mode> {
    Mode::from_raw(raw).with_context(|| format!("mode must be 0-3, got {raw}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Probe { bus, address } => cmd_probe(bus, &address),
        Cmd::Read {
            bus,
            dev,
            stn,
            port,
            mode,
            reg,
        } => cmd_read(bus, dev, stn, port, parse_mode(mode)?, reg),
        Cmd::Write {
            bus,
            dev,
            stn,
            port,
            mode,
            reg,
            value,
        } => cmd_write(bus, dev, stn, port, parse_mode(mode)?, reg, value),
        Cmd::Dump {
            bus,
            dev,
            stn,
            port,
            mode,
            raw,
        } => cmd_dump(bus, dev, stn, port, parse_mode(mode)?, raw),
        Cmd::Status { bus, dev } => cmd_status(bus, dev),
    }
}

fn cmd_probe(bus: u8, addresses: &[u8]) -> Result<()> {
    let addresses = if addresses.is_empty() {
        pex_driver::default_addresses()
    } else {
        addresses.to_vec()
    };

    let found = pex_driver::probe_addresses(bus, &addresses)?;

    for d in &found {
        println!(
            "Found {}-{:02X} at {}-{:04x}",
            d.family.name, d.revision, d.bus, d.address
        );
    }
    println!("{} device(s) on bus {bus}", found.len());

    Ok(())
}

fn cmd_read(bus: u8, dev: u8, stn: u8, port: u8, mode: Mode, reg: u32) -> Result<()> {
    let mut pex = PexDevice::open(bus, dev)?;
    let value = pex.read(stn, port, mode, reg)?;

    println!("{bus}-{dev:04X}[{reg:03x}]: {value:08x}");

    pex.close();
    Ok(())
}

fn cmd_write(
    bus: u8,
    dev: u8,
    stn: u8,
    port: u8,
    mode: Mode,
    reg: u32,
    value: u32,
) -> Result<()> {
    let mut pex = PexDevice::open(bus, dev)?;
    pex.write(stn, port, mode, reg, value)?;

    println!("{bus}-{dev:04X}[{reg:03x}] <- {value:08x}");

    pex.close();
    Ok(())
}

fn cmd_dump(bus: u8, dev: u8, stn: u8, port: u8, mode: Mode, raw: bool) -> Result<()> {
    let mut pex = PexDevice::open(bus, dev)?;

    if !pex.port_enabled(port) {
        bail!("{port} is not a valid port on {}", pex.name());
    }

    let mut stdout = std::io::stdout().lock();

    for offset in (0..regs::REG_SPACE_SIZE).step_by(4) {
        // Sweep until the chip stops answering.
        let Ok(value) = pex.read(stn, port, mode, offset) else {
            break;
        };

        if raw {
            stdout.write_all(&value.to_ne_bytes())?;
        } else {
            writeln!(stdout, "{offset:03x}: {value:08x}")?;
        }
    }

    pex.close();
    Ok(())
}

/// Colorize a port number by its debug-status word: bright green fully up,
/// blue up without lanes, dim red down, dim yellow anything else.
fn port_colored(port: u8, status: u32) -> String {
    match status {
        regs::link::UP => format!(" \x1b[1;92m{port}\x1b[0m"),
        regs::link::UP_NO_LANES => format!(" \x1b[34m{port}\x1b[0m"),
        regs::link::DOWN => format!(" \x1b[2;31m{port}\x1b[0m"),
        _ => format!(" \x1b[2;33m{port}\x1b[0m"),
    }
}

fn cmd_status(bus: u8, dev: u8) -> Result<()> {
    let mut pex = PexDevice::open(bus, dev)?;

    println!(
        "Device: {} ven[{:04x}] dev[{:04x}] rev[{:02X}]",
        pex.name(),
        pex.vendor_id(),
        pex.device_id(),
        pex.revision()
    );
    println!("Ports enabled: {:06x}", pex.ports());

    // Raw management-port words; field meanings are chip-documentation
    // territory, so they are printed undecoded.
    let mngmt = pex.read(0, 0, Mode::Transparent, regs::MGMT_PORT_CONFIG)?;
    let vls = pex.read(0, 0, Mode::Transparent, regs::VS_VLS_MASK)?;
    println!("Management Port Config: {mngmt:08x}");
    println!("VLS Mask: {vls:08x}");

    for stn in 0..pex.family().stations {
        print!("PEX Ports[{stn}]:");
        for port in 0..24 {
            if !pex.port_enabled(port) {
                continue;
            }
            let status = pex.read(stn, port, Mode::Transparent, regs::PORT_DEBUG_STATUS)?;
            print!("{}", port_colored(port, status));
        }
        println!();
    }

    // NT and DMA spaces answer on fixed low ports regardless of the port
    // bitmap; a failed read displays as down.
    for (label, mode, ports) in [
        ("NTV ", Mode::NtVirtual, &[0u8, 1][..]),
        ("NTL ", Mode::NtLink, &[0, 1][..]),
        ("DMA ", Mode::Dma, &[0, 1, 2, 3][..]),
    ] {
        print!("{label}:");
        for &port in ports {
            let status = pex
                .read(0, port, mode, regs::PORT_DEBUG_STATUS)
                .unwrap_or(regs::link::DOWN);
            print!("{}", port_colored(port, status));
        }
        println!();
    }

    let dram = pex
        .read(0, 4, Mode::Dma, regs::PORT_DEBUG_STATUS)
        .unwrap_or(regs::link::DOWN);
    println!("DRAM:{}", port_colored(0, dram));

    pex.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprefixed_numbers_parse_as_decimal() {
        // "10" is ten, never sixteen.
        assert_eq!(num_u32("10"), Ok(10));
        assert_eq!(num_u8("10"), Ok(10));
        assert_eq!(num_u8("56"), Ok(56));
    }

    #[test]
    fn hex_requires_the_prefix() {
        assert_eq!(num_u32("0x314"), Ok(0x314));
        assert_eq!(num_u8("0x38"), Ok(0x38));
        assert_eq!(num_u8("0X38"), Ok(0x38));
        assert!(num_u32("3a4").is_err());
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert!(num_u8("0x100").is_err());
        assert!(num_u8("256").is_err());
        assert!(num_u32("0xZZ").is_err());
    }
}
