//! I2C bus transport.
//!
//! [`I2cTransport`] is the seam between the device logic and the host's I2C
//! adapter: select a slave address, write bytes, or write-then-read in one
//! combined transaction. [`I2cBus`] implements it over Linux `/dev/i2c-N`.
//!
//! The i2c-dev ioctls are kernel-specific, so this module talks to them
//! through `libc::ioctl` with `#[repr(C)]` message structs matching
//! `<linux/i2c-dev.h>`.

// Buffer lengths are bounded by 8-byte command payloads; the kernel API
// takes u16 lengths.
#![allow(clippy::cast_possible_truncation)]

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

use crate::error::{PexError, Result};

/// One transaction seam to the host's I2C adapter.
///
/// A transport tracks one selected slave address at a time; the selection is
/// stateful and persists until changed, which is why a transport must never
/// be shared between concurrent sessions.
pub trait I2cTransport {
    /// Select the slave address subsequent transactions target.
    fn set_address(&mut self, address: u8) -> Result<()>;

    /// Send `bytes` as a single bus write.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Send `bytes`, then read exactly `recv.len()` bytes back from the same
    /// slave without releasing the bus in between.
    fn write_read(&mut self, bytes: &[u8], recv: &mut [u8]) -> Result<()>;
}

// <linux/i2c-dev.h> ioctl numbers.
const I2C_SLAVE: libc::c_ulong = 0x0703;
const I2C_RDWR: libc::c_ulong = 0x0707;

// <linux/i2c.h> message flag: this segment is a read.
const I2C_M_RD: u16 = 0x0001;

/// One segment of an I2C_RDWR transaction (`struct i2c_msg`).
#[repr(C)]
struct I2cMsg {
    addr: u16,
    flags: u16,
    len: u16,
    buf: *mut u8,
}

/// Argument block for I2C_RDWR (`struct i2c_rdwr_ioctl_data`).
#[repr(C)]
struct I2cRdwrIoctlData {
    msgs: *mut I2cMsg,
    nmsgs: u32,
}

/// Linux i2c-dev transport: one open `/dev/i2c-N` targeting one slave.
#[derive(Debug)]
pub struct I2cBus {
    file: File,
    bus: u8,
    address: u8,
}

impl I2cBus {
    /// Open bus `/dev/i2c-<bus>`. No slave address is selected yet.
    ///
    /// # Errors
    ///
    /// Returns [`PexError::BusUnavailable`] if the device node cannot be
    /// opened.
    pub fn open(bus: u8) -> Result<Self> {
        let path = format!("/dev/i2c-{bus}");

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| PexError::BusUnavailable { bus, source })?;

        tracing::debug!("opened {path}");

        Ok(Self {
            file,
            bus,
            address: 0,
        })
    }

    /// Bus index this transport is bound to.
    #[must_use]
    pub const fn bus(&self) -> u8 {
        self.bus
    }

    /// Currently selected slave address.
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    fn rdwr(&mut self, msgs: &mut [I2cMsg]) -> Result<()> {
        let mut data = I2cRdwrIoctlData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: msgs.len() as u32,
        };

        // SAFETY: I2C_RDWR performs the combined transaction atomically in
        // the kernel. Invariants: (1) self.file is an open i2c-dev fd;
        // (2) every msg.buf points at a live buffer of at least msg.len
        // bytes for the duration of the call; (3) struct layouts match
        // <linux/i2c.h> and <linux/i2c-dev.h>.
        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), I2C_RDWR, &raw mut data) };

        if ret < 0 {
            let err = std::io::Error::last_os_error();
            return Err(PexError::transaction(format!(
                "I2C_RDWR on bus {} addr {:#04x}: {err}",
                self.bus, self.address
            )));
        }

        Ok(())
    }
}

impl I2cTransport for I2cBus {
    fn set_address(&mut self, address: u8) -> Result<()> {
        // SAFETY: I2C_SLAVE takes the address as the ioctl argument word.
        // self.file is an open i2c-dev fd; the kernel validates the address
        // and refuses ones claimed by another driver.
        let ret =
            unsafe { libc::ioctl(self.file.as_raw_fd(), I2C_SLAVE, libc::c_ulong::from(address)) };

        if ret < 0 {
            return Err(PexError::AddressSelectFailed {
                address,
                source: std::io::Error::last_os_error(),
            });
        }

        self.address = address;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut send = bytes.to_vec();
        let mut msgs = [I2cMsg {
            addr: u16::from(self.address),
            flags: 0,
            len: send.len() as u16,
            buf: send.as_mut_ptr(),
        }];

        self.rdwr(&mut msgs)
    }

    fn write_read(&mut self, bytes: &[u8], recv: &mut [u8]) -> Result<()> {
        let mut send = bytes.to_vec();
        let mut msgs = [
            I2cMsg {
                addr: u16::from(self.address),
                flags: 0,
                len: send.len() as u16,
                buf: send.as_mut_ptr(),
            },
            I2cMsg {
                addr: u16::from(self.address),
                flags: I2C_M_RD,
                len: recv.len() as u16,
                buf: recv.as_mut_ptr(),
            },
        ];

        self.rdwr(&mut msgs)
    }
}
