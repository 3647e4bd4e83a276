//! Open device sessions.
//!
//! A [`PexDevice`] is one identified switch on one bus address: catalog
//! topology, identity read off the chip, a live enabled-port bitmap, and
//! exclusive ownership of the transport. All register access funnels
//! through it so the port is validated before anything touches the bus.

use pex_chip::catalog::ChipFamily;
use pex_chip::{regs, Mode};

use crate::error::{PexError, Result};
use crate::probe::identify;
use crate::transport::{I2cBus, I2cTransport};

/// One open, identified PEX87xx switch.
///
/// Generic over the transport so device logic can run against a scripted
/// bus in tests; production code uses [`PexDevice<I2cBus>`] via
/// [`PexDevice::open`].
#[derive(Debug)]
pub struct PexDevice<T = I2cBus> {
    vendor_id: u16,
    device_id: u16,
    revision: u8,
    family: &'static ChipFamily,
    bus: u8,
    address: u8,
    /// Live enabled-port bitmap. Starts as the catalog default, narrowed at
    /// open time by the port-enable status register. Always a subset of
    /// `family.ports`.
    ports: u32,
    transport: T,
}

impl PexDevice<I2cBus> {
    /// Open and identify the device at `address` on `/dev/i2c-<bus>`.
    ///
    /// # Errors
    ///
    /// [`PexError::BusUnavailable`] if the bus node cannot be opened,
    /// [`PexError::AddressSelectFailed`] if the kernel refuses the address,
    /// [`PexError::UnknownVendor`] / [`PexError::UnknownDevice`] if the
    /// chip at that address is not a catalogued PEX87xx, or
    /// [`PexError::TransactionFailed`] if nothing answers. On any failure
    /// the transport is released; no partial session survives.
    pub fn open(bus: u8, address: u8) -> Result<Self> {
        Self::with_transport(I2cBus::open(bus)?, bus, address)
    }
}

impl<T: I2cTransport> PexDevice<T> {
    /// Run the full identify-and-open sequence over an already-open
    /// transport.
    ///
    /// # Errors
    ///
    /// Same contract as [`PexDevice::open`]; the transport is dropped on
    /// any failure.
    pub fn with_transport(mut transport: T, bus: u8, address: u8) -> Result<Self> {
        transport.set_address(address)?;

        let id = identify(&mut transport)?;

        let mut dev = Self {
            vendor_id: id.vendor,
            device_id: id.device,
            revision: id.revision,
            family: id.family,
            bus,
            address,
            ports: id.family.ports,
            transport,
        };

        // Narrow the catalog default to the ports actually enabled by
        // straps/EEPROM. This read itself validates against the default
        // bitmap, which always contains port 0.
        let status = dev.read(0, 0, Mode::Transparent, regs::PORT_ENABLE_STATUS)?;
        dev.ports &= status;

        tracing::info!(
            "found {}-{:02X} at {}-{:04x}, ports {:06x}",
            dev.family.name,
            dev.revision,
            bus,
            address,
            dev.ports
        );

        Ok(dev)
    }

    /// Read a 32-bit register.
    ///
    /// `port` is the chip-wide port number; it must be set in the live
    /// enabled-port bitmap or the call fails with [`PexError::InvalidPort`]
    /// before any bus traffic.
    ///
    /// # Errors
    ///
    /// [`PexError::InvalidPort`] or [`PexError::TransactionFailed`].
    pub fn read(&mut self, station: u8, port: u8, mode: Mode, register: u32) -> Result<u32> {
        self.check_port(port)?;

        let cmd = self.family.dialect.read(port, mode, station, register);
        let mut recv = [0u8; 4];
        self.transport.write_read(&cmd.to_wire(), &mut recv)?;

        Ok(u32::from_be_bytes(recv))
    }

    /// Write a 32-bit register.
    ///
    /// Command word and big-endian value go out as one 8-byte transfer.
    /// No read-back verification; issue an explicit [`PexDevice::read`] if
    /// confirmation matters.
    ///
    /// # Errors
    ///
    /// [`PexError::InvalidPort`] or [`PexError::TransactionFailed`].
    pub fn write(
        &mut self,
        station: u8,
        port: u8,
        mode: Mode,
        register: u32,
        value: u32,
    ) -> Result<()> {
        self.check_port(port)?;

        let cmd = self.family.dialect.write(port, mode, station, register);
        let mut payload = [0u8; 8];
        payload[..4].copy_from_slice(&cmd.to_wire());
        payload[4..].copy_from_slice(&value.to_be_bytes());

        self.transport.write(&payload)
    }

    /// Is `port` in the live enabled-port bitmap?
    #[must_use]
    pub const fn port_enabled(&self, port: u8) -> bool {
        port < 32 && self.ports & (1 << port) != 0
    }

    fn check_port(&self, port: u8) -> Result<()> {
        if self.port_enabled(port) {
            Ok(())
        } else {
            Err(PexError::InvalidPort { port })
        }
    }

    /// Release the session and its transport.
    ///
    /// Consuming `self` makes use-after-close a compile error rather than a
    /// runtime one.
    pub fn close(self) {
        tracing::debug!(
            "closing {} at {}-{:04x}",
            self.family.name,
            self.bus,
            self.address
        );
    }

    /// Vendor id read off the chip.
    #[must_use]
    pub const fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    /// Device id read off the chip.
    #[must_use]
    pub const fn device_id(&self) -> u16 {
        self.device_id
    }

    /// Silicon revision.
    #[must_use]
    pub const fn revision(&self) -> u8 {
        self.revision
    }

    /// Catalog entry this device matched.
    #[must_use]
    pub const fn family(&self) -> &'static ChipFamily {
        self.family
    }

    /// Chip family name, e.g. `"PEX8724"`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.family.name
    }

    /// I2C bus index.
    #[must_use]
    pub const fn bus(&self) -> u8 {
        self.bus
    }

    /// 7-bit slave address.
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Live enabled-port bitmap.
    #[must_use]
    pub const fn ports(&self) -> u32 {
        self.ports
    }
}
