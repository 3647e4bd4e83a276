//! Device-session and prober tests against a scripted I2C bus.
//!
//! The stub decodes real command words, so these tests exercise the exact
//! wire format: 4-byte big-endian command out, 4-byte big-endian value back
//! for reads, 8-byte command+value payload for writes.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use pex_chip::command::{CommandWord, OP_READ, OP_WRITE};
use pex_chip::{catalog, regs, Mode};
use pex_driver::{scan_with, I2cTransport, PexDevice, PexError, Result};

/// (address, station, port, mode, register)
type RegKey = (u8, u8, u8, u8, u32);

/// Scripted bus: registers keyed by the decoded command-word fields.
/// Reads of unpopulated registers fail like a NACK; writes are stored, so
/// the stub echoes them back on the next read.
#[derive(Debug, Default)]
struct StubBus {
    regs: HashMap<RegKey, u32>,
    selected: u8,
    /// Addresses the kernel refuses to select, as when another driver has
    /// claimed them.
    refused: Vec<u8>,
    transactions: Rc<Cell<usize>>,
}

impl StubBus {
    fn new() -> Self {
        Self::default()
    }

    /// Populate the identification registers for one chip.
    fn with_chip(
        mut self,
        address: u8,
        vendor: u16,
        device: u16,
        revision: u8,
        port_status: u32,
    ) -> Self {
        let ident = (u32::from(device) << 16) | u32::from(vendor);
        self.load(address, regs::PCI_VENDOR_ID, ident);
        self.load(address, regs::PCI_CLASS_REVISION, u32::from(revision));
        self.load(address, regs::PORT_ENABLE_STATUS, port_status);
        self
    }

    fn load(&mut self, address: u8, register: u32, value: u32) {
        self.regs.insert((address, 0, 0, 0, register), value);
    }

    /// Make `set_address` fail for `address`.
    fn refuse(mut self, address: u8) -> Self {
        self.refused.push(address);
        self
    }

    fn transaction_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.transactions)
    }

    fn key(&self, cmd: CommandWord) -> RegKey {
        (
            self.selected,
            cmd.station(),
            cmd.port(),
            cmd.mode(),
            cmd.register(),
        )
    }
}

impl I2cTransport for StubBus {
    fn set_address(&mut self, address: u8) -> Result<()> {
        if self.refused.contains(&address) {
            return Err(PexError::AddressSelectFailed {
                address,
                source: std::io::Error::from_raw_os_error(libc::EBUSY),
            });
        }
        self.selected = address;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.transactions.set(self.transactions.get() + 1);

        assert_eq!(bytes.len(), 8, "register writes are one 8-byte payload");
        let cmd = CommandWord::from_raw(u32::from_be_bytes(bytes[..4].try_into().unwrap()));
        assert_eq!(cmd.op(), OP_WRITE);
        assert_eq!(cmd.byte_mask(), 0xF);

        let value = u32::from_be_bytes(bytes[4..].try_into().unwrap());
        let key = self.key(cmd);
        self.regs.insert(key, value);
        Ok(())
    }

    fn write_read(&mut self, bytes: &[u8], recv: &mut [u8]) -> Result<()> {
        self.transactions.set(self.transactions.get() + 1);

        assert_eq!(bytes.len(), 4, "register reads send a 4-byte command");
        assert_eq!(recv.len(), 4, "register reads receive a 4-byte value");
        let cmd = CommandWord::from_raw(u32::from_be_bytes(bytes.try_into().unwrap()));
        assert_eq!(cmd.op(), OP_READ);

        match self.regs.get(&self.key(cmd)) {
            Some(value) => {
                recv.copy_from_slice(&value.to_be_bytes());
                Ok(())
            }
            None => Err(PexError::transaction(format!(
                "no answer at {:#04x}",
                self.selected
            ))),
        }
    }
}

fn pex8724_at_0x38() -> StubBus {
    StubBus::new().with_chip(0x38, catalog::VENDOR_PLX, 0x8724, 0x01, 0x0000_070F)
}

#[test]
fn open_pex8724_end_to_end() {
    let dev = PexDevice::with_transport(pex8724_at_0x38(), 2, 0x38).unwrap();

    assert_eq!(dev.name(), "PEX8724");
    assert_eq!(dev.vendor_id(), 0x10B5);
    assert_eq!(dev.device_id(), 0x8724);
    assert_eq!(dev.revision(), 1);
    assert_eq!(dev.bus(), 2);
    assert_eq!(dev.address(), 0x38);
    assert_eq!(dev.ports(), 0x0000_070F);
    assert_eq!(dev.family().stations, 2);

    dev.close();
}

#[test]
fn invalid_port_causes_no_bus_traffic() {
    let stub = pex8724_at_0x38();
    let counter = stub.transaction_counter();
    let mut dev = PexDevice::with_transport(stub, 2, 0x38).unwrap();

    let after_open = counter.get();
    assert_eq!(after_open, 3, "two identity reads plus the narrowing read");

    // Port 4 is outside PEX8724's 0x70F bitmap.
    assert!(matches!(
        dev.read(0, 4, Mode::Transparent, 0x000),
        Err(PexError::InvalidPort { port: 4 })
    ));
    assert!(matches!(
        dev.write(0, 4, Mode::Transparent, 0x000, 0x1234_5678),
        Err(PexError::InvalidPort { port: 4 })
    ));

    assert_eq!(counter.get(), after_open, "rejection must not touch the bus");
}

#[test]
fn live_ports_narrow_to_runtime_status() {
    // Only ports 0 and 1 strapped on: live bitmap is default AND status.
    let stub = StubBus::new().with_chip(0x38, catalog::VENDOR_PLX, 0x8724, 0x02, 0x0000_0003);
    let mut dev = PexDevice::with_transport(stub, 2, 0x38).unwrap();

    assert_eq!(dev.ports(), 0x0000_0003);
    assert!(dev.port_enabled(0));
    assert!(!dev.port_enabled(8), "port 8 is default-enabled but strapped off");
    assert!(matches!(
        dev.read(0, 8, Mode::Transparent, 0xF70),
        Err(PexError::InvalidPort { port: 8 })
    ));
}

#[test]
fn narrowed_ports_are_subset_for_every_family() {
    for family in catalog::KNOWN_DEVICES {
        // A status register claiming every port enabled must still be
        // clamped to the catalog default.
        let stub = StubBus::new().with_chip(
            0x38,
            catalog::VENDOR_BROADCOM,
            family.device_id,
            0x03,
            0xFFFF_FFFF,
        );
        let dev = PexDevice::with_transport(stub, 0, 0x38).unwrap();
        assert_eq!(dev.ports(), family.ports, "{}", family.name);
        assert_eq!(dev.ports() & !family.ports, 0, "{}", family.name);
    }
}

#[test]
fn write_then_read_round_trip() {
    let mut dev = PexDevice::with_transport(pex8724_at_0x38(), 2, 0x38).unwrap();

    dev.write(1, 9, Mode::Transparent, 0x200, 0xDEAD_BEEF).unwrap();
    assert_eq!(dev.read(1, 9, Mode::Transparent, 0x200).unwrap(), 0xDEAD_BEEF);

    // Distinct mode contexts address distinct register spaces.
    dev.write(0, 0, Mode::Dma, 0x0C0, 0x0000_00AA).unwrap();
    dev.write(0, 0, Mode::NtVirtual, 0x0C0, 0x0000_00BB).unwrap();
    assert_eq!(dev.read(0, 0, Mode::Dma, 0x0C0).unwrap(), 0xAA);
    assert_eq!(dev.read(0, 0, Mode::NtVirtual, 0x0C0).unwrap(), 0xBB);
}

#[test]
fn scan_continues_past_dead_addresses() {
    let mut stub = pex8724_at_0x38();

    let found = scan_with(&mut stub, 2, &[0x10, 0x38, 0x50]);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].family.name, "PEX8724");
    assert_eq!(found[0].revision, 1);
    assert_eq!(found[0].bus, 2);
    assert_eq!(found[0].address, 0x38);
}

#[test]
fn scan_continues_past_refused_address_select() {
    // 0x18 is claimed by another driver; the scan must still reach 0x38.
    let mut stub = pex8724_at_0x38().refuse(0x18);

    let found = scan_with(&mut stub, 2, &[0x18, 0x38]);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].address, 0x38);
}

#[test]
fn scan_finds_multiple_devices() {
    let mut stub = StubBus::new()
        .with_chip(0x38, catalog::VENDOR_PLX, 0x8724, 0x01, 0x70F)
        .with_chip(0x5A, catalog::VENDOR_LSI, 0x8796, 0x04, 0xFF_FFFF);

    let found = scan_with(&mut stub, 1, &pex_driver::default_addresses());

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].family.device_id, 0x8724);
    assert_eq!(found[1].family.device_id, 0x8796);
}

#[test]
fn unknown_vendor_rejected_and_transport_released() {
    let stub = StubBus::new().with_chip(0x38, 0x1234, 0x8724, 0x01, 0x70F);
    let counter = stub.transaction_counter();

    let err = PexDevice::with_transport(stub, 2, 0x38).unwrap_err();
    assert!(matches!(err, PexError::UnknownVendor { vendor: 0x1234 }));

    // The failed open consumed and dropped the transport: only our clone of
    // the counter remains.
    assert_eq!(Rc::strong_count(&counter), 1);
    assert_eq!(counter.get(), 1, "rejected before the revision read");
}

#[test]
fn unknown_device_rejected() {
    let stub = StubBus::new().with_chip(0x38, catalog::VENDOR_PLX, 0x9999, 0x01, 0x70F);

    let err = PexDevice::with_transport(stub, 2, 0x38).unwrap_err();
    assert!(matches!(err, PexError::UnknownDevice { device: 0x9999 }));
}

#[test]
fn failed_narrowing_read_fails_the_open() {
    // Identity answers but the port-enable register does not.
    let mut stub = StubBus::new();
    stub.load(
        0x38,
        regs::PCI_VENDOR_ID,
        (0x8724 << 16) | u32::from(catalog::VENDOR_PLX),
    );
    stub.load(0x38, regs::PCI_CLASS_REVISION, 0x01);

    let err = PexDevice::with_transport(stub, 2, 0x38).unwrap_err();
    assert!(matches!(err, PexError::TransactionFailed { .. }));
}
