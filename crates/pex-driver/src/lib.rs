//! Userspace I2C driver for PLX / Broadcom / LSI PEX87xx PCIe switches.
//!
//! PEX87xx parts expose their per-port configuration space as an I2C slave:
//! a 4-byte command word selects (mode, station, port, register), and the
//! chip answers with the 4-byte register value in the same combined
//! transaction. This crate owns the bus transport, the identify-and-open
//! handshake, and the per-session port validation; the pure silicon model
//! (command words, register offsets, chip catalog) lives in [`pex_chip`].
//!
//! # Quick start
//!
//! ```no_run
//! use pex_driver::{PexDevice, Result};
//! use pex_chip::Mode;
//!
//! # fn main() -> Result<()> {
//! // PEX8724 strapped at address 0x38 on /dev/i2c-2
//! let mut dev = PexDevice::open(2, 0x38)?;
//! println!("{}-{:02X}, ports {:06x}", dev.name(), dev.revision(), dev.ports());
//!
//! let status = dev.read(0, 0, Mode::Transparent, 0xF70)?;
//! println!("port 0 debug status: {status:08x}");
//! dev.close();
//! # Ok(())
//! # }
//! ```
//!
//! Everything is single-threaded and blocking: one transport belongs to one
//! session, the selected slave address is stateful per bus handle, and no
//! operation retries.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod error;
mod probe;
mod session;
mod transport;

pub use error::{PexError, Result};
pub use probe::{default_addresses, probe_addresses, probe_bus, scan_with, Discovery, SCAN_BANDS};
pub use session::PexDevice;
pub use transport::{I2cBus, I2cTransport};

/// Commonly used types.
pub mod prelude {
    pub use crate::{probe_bus, Discovery, I2cBus, I2cTransport, PexDevice, PexError, Result};
    pub use pex_chip::{catalog, regs, Mode};
}
