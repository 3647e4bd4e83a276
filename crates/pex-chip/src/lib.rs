//! Silicon model for PLX / Broadcom / LSI PEX87xx PCIe switches.
//!
//! This crate has **no dependencies** and **no hardware access** — it is a
//! pure model of the silicon as seen from the I2C slave interface: the
//! 32-bit command-word format, the fixed register offsets the slave
//! interface exposes, and the per-family topology catalog.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`command`] | Command-word encoding: opcode, mode, station, port, byte-enable, register |
//! | [`regs`] | Fixed register offsets (PCI identity, port enable, port debug status) |
//! | [`catalog`] | Known chip families: port bitmaps, station layout, command dialect |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod command;
pub mod regs;

pub use catalog::{ChipFamily, KNOWN_DEVICES, KNOWN_VENDORS};
pub use command::{CommandDialect, CommandWord, Mode};
