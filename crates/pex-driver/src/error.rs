//! Error types for PEX87xx driver operations.

use thiserror::Error;

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, PexError>;

/// Errors that can occur talking to a PEX87xx switch over I2C.
///
/// Nothing here retries: a failed transaction means the target register or
/// address is not accessible right now, and the caller decides what that
/// means (the bus prober, for instance, treats everything except
/// [`PexError::BusUnavailable`] as "no match at this address").
#[derive(Debug, Error)]
pub enum PexError {
    /// The I2C bus device node could not be opened.
    #[error("I2C bus {bus} unavailable: {source}")]
    BusUnavailable {
        /// Bus index (as in `/dev/i2c-<bus>`).
        bus: u8,
        /// Underlying open error.
        #[source]
        source: std::io::Error,
    },

    /// The kernel rejected selecting a slave address on the bus.
    #[error("cannot select slave address {address:#04x}: {source}")]
    AddressSelectFailed {
        /// 7-bit slave address.
        address: u8,
        /// Underlying ioctl error.
        #[source]
        source: std::io::Error,
    },

    /// A bus transaction failed (NACK, timeout, short transfer).
    #[error("I2C transaction failed: {reason}")]
    TransactionFailed {
        /// Reason for failure.
        reason: String,
    },

    /// The requested port is not in the device's enabled-port bitmap.
    /// Rejected locally; no bus traffic occurs.
    #[error("port {port} is not enabled on this device")]
    InvalidPort {
        /// Requested port index.
        port: u8,
    },

    /// Identification read returned a vendor id outside the allow-list.
    #[error("unknown vendor id {vendor:#06x}")]
    UnknownVendor {
        /// Vendor id the device reported.
        vendor: u16,
    },

    /// Vendor matched but the device id is not in the catalog.
    #[error("unknown device id {device:#06x}")]
    UnknownDevice {
        /// Device id the device reported.
        device: u16,
    },
}

impl PexError {
    /// Create a transaction failure from any displayable cause.
    pub fn transaction(reason: impl Into<String>) -> Self {
        Self::TransactionFailed {
            reason: reason.into(),
        }
    }
}
