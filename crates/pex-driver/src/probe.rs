//! Bus probing and device identification.
//!
//! Probing walks a restricted set of slave-address bands (real boards only
//! strap PEX87xx chips into a few ranges), attempts the identification
//! handshake at each, and reports what it finds. A failed probe at one
//! address never aborts the scan; only failure to open the bus itself does.

use pex_chip::catalog::{self, ChipFamily};
use pex_chip::command::CommandDialect;
use pex_chip::{regs, Mode};

use crate::error::{PexError, Result};
use crate::transport::{I2cBus, I2cTransport};

/// Slave-address bands boards populate, as `(first, last)` inclusive.
pub const SCAN_BANDS: &[(u8, u8)] = &[
    (0x18, 0x1F),
    (0x38, 0x3F),
    (0x58, 0x5F),
    (0x68, 0x6F),
    (0x70, 0x77),
];

/// Every candidate address in [`SCAN_BANDS`], in scan order.
#[must_use]
pub fn default_addresses() -> Vec<u8> {
    SCAN_BANDS
        .iter()
        .flat_map(|&(first, last)| first..=last)
        .collect()
}

/// One device found during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discovery {
    /// Catalog entry the device matched.
    pub family: &'static ChipFamily,
    /// Silicon revision.
    pub revision: u8,
    /// Bus index it was found on.
    pub bus: u8,
    /// Slave address it answered at.
    pub address: u8,
}

/// Identity read off a chip during the handshake.
pub(crate) struct Identity {
    pub vendor: u16,
    pub device: u16,
    pub revision: u8,
    pub family: &'static ChipFamily,
}

/// Register read without a session, for identification only.
///
/// Uses the common dialect and skips port validation: the device family —
/// and with it the real port map — is exactly what we are trying to learn.
fn raw_read<T: I2cTransport>(transport: &mut T, register: u32) -> Result<u32> {
    let cmd = CommandDialect::Pex87xx.read(0, Mode::Transparent, 0, register);
    let mut recv = [0u8; 4];
    transport.write_read(&cmd.to_wire(), &mut recv)?;
    Ok(u32::from_be_bytes(recv))
}

/// Two-read identification handshake against the currently selected slave.
pub(crate) fn identify<T: I2cTransport>(transport: &mut T) -> Result<Identity> {
    let ident = raw_read(transport, regs::PCI_VENDOR_ID)?;
    let vendor = (ident & 0xFFFF) as u16;
    let device = (ident >> 16) as u16;

    if !catalog::is_known_vendor(vendor) {
        return Err(PexError::UnknownVendor { vendor });
    }

    let class_rev = raw_read(transport, regs::PCI_CLASS_REVISION)?;
    let revision = (class_rev & 0xFF) as u8;

    let family = catalog::lookup(device).ok_or(PexError::UnknownDevice { device })?;

    Ok(Identity {
        vendor,
        device,
        revision,
        family,
    })
}

/// Scan `addresses` on an already-open transport, reporting every match.
///
/// Per-address failures (nothing answering, unknown silicon, address
/// claimed by another driver) are logged and skipped.
pub fn scan_with<T: I2cTransport>(transport: &mut T, bus: u8, addresses: &[u8]) -> Vec<Discovery> {
    let mut found = Vec::new();

    for &address in addresses {
        if let Err(e) = transport.set_address(address) {
            tracing::trace!("skip {bus}-{address:04x}: {e}");
            continue;
        }

        match identify(transport) {
            Ok(id) => {
                tracing::info!(
                    "found {}-{:02X} at {bus}-{address:04x}",
                    id.family.name,
                    id.revision
                );
                found.push(Discovery {
                    family: id.family,
                    revision: id.revision,
                    bus,
                    address,
                });
            }
            Err(e) => {
                tracing::trace!("no match at {bus}-{address:04x}: {e}");
            }
        }
    }

    found
}

/// Scan the given candidate addresses on `/dev/i2c-<bus>`.
///
/// # Errors
///
/// [`PexError::BusUnavailable`] if the bus node cannot be opened. Failed
/// probes at individual addresses are not errors.
pub fn probe_addresses(bus: u8, addresses: &[u8]) -> Result<Vec<Discovery>> {
    let mut transport = I2cBus::open(bus)?;
    Ok(scan_with(&mut transport, bus, addresses))
}

/// Scan the default address bands on `/dev/i2c-<bus>` and return how many
/// known devices identified.
///
/// # Errors
///
/// [`PexError::BusUnavailable`] if the bus node cannot be opened.
pub fn probe_bus(bus: u8) -> Result<usize> {
    Ok(probe_addresses(bus, &default_addresses())?.len())
}
