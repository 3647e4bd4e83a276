//! I2C command-word encoding for the PEX87xx slave interface.
//!
//! Every register access over I2C starts with a 32-bit command word sent
//! big-endian. The layout is fixed by the hardware:
//!
//! ```text
//! bits [26:24]  opcode          read = 0x4, write = 0x3
//! bits [21:20]  mode            transparent / NT-link / NT-virtual / DMA
//! bits [19:18]  station index
//! bits [17:15]  port index      within the station
//! bits [13:10]  byte enables    one bit per byte lane, always all-4 here
//! bits  [9:0]   register >> 2   word index into the 4 KB register space
//! ```
//!
//! Reads are a 4-byte command followed by a 4-byte big-endian value in the
//! same combined transaction; writes are the command and the big-endian
//! value concatenated into one 8-byte transfer.

/// Register-read opcode.
pub const OP_READ: u8 = 0x04;
/// Register-write opcode.
pub const OP_WRITE: u8 = 0x03;

/// Byte-enable lane masks.
pub mod byte_mask {
    /// Byte lane 0.
    pub const BYTE0: u8 = 0x01;
    /// Byte lane 1.
    pub const BYTE1: u8 = 0x02;
    /// Byte lane 2.
    pub const BYTE2: u8 = 0x04;
    /// Byte lane 3.
    pub const BYTE3: u8 = 0x08;
    /// All four byte lanes — the only mask this toolkit transmits.
    pub const ALL: u8 = BYTE0 | BYTE1 | BYTE2 | BYTE3;
}

/// Register-space context an access targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    /// Transparent switching registers.
    Transparent = 0,
    /// Non-transparent link side.
    NtLink = 1,
    /// Non-transparent virtual side.
    NtVirtual = 2,
    /// DMA engine registers.
    Dma = 3,
}

impl Mode {
    /// Decode a raw 2-bit mode field.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Transparent),
            1 => Some(Self::NtLink),
            2 => Some(Self::NtVirtual),
            3 => Some(Self::Dma),
            _ => None,
        }
    }

    /// Raw 2-bit field value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

/// Command-word dialect a chip family speaks.
///
/// Every family in today's catalog uses the common PEX87xx layout, but the
/// dialect is carried per [`crate::catalog::ChipFamily`] entry so a future
/// part with a different packing extends the enum rather than the call
/// sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandDialect {
    /// Common PEX87xx command layout (all known parts).
    Pex87xx,
}

impl CommandDialect {
    /// Encode a command word for this dialect.
    ///
    /// Pure and total: callers constrain the ranges (port 0–7 within a
    /// station, mode 0–3, station 0–3); out-of-range bits are masked off,
    /// not rejected.
    #[must_use]
    pub const fn encode(
        self,
        op: u8,
        port: u8,
        mode: Mode,
        station: u8,
        register: u32,
        mask: u8,
    ) -> CommandWord {
        match self {
            Self::Pex87xx => {
                let word = (((op as u32) & 0x7) << 24)
                    | (((mode.raw() as u32) & 0x3) << 20)
                    | (((station as u32) & 0x3) << 18)
                    | (((port as u32) & 0x7) << 15)
                    | (((mask as u32) & 0xF) << 10)
                    | ((register >> 2) & 0x3FF);
                CommandWord(word)
            }
        }
    }

    /// Encode a full-mask register read.
    #[must_use]
    pub const fn read(self, port: u8, mode: Mode, station: u8, register: u32) -> CommandWord {
        self.encode(OP_READ, port, mode, station, register, byte_mask::ALL)
    }

    /// Encode a full-mask register write.
    #[must_use]
    pub const fn write(self, port: u8, mode: Mode, station: u8, register: u32) -> CommandWord {
        self.encode(OP_WRITE, port, mode, station, register, byte_mask::ALL)
    }
}

/// An encoded 32-bit command word.
///
/// Field accessors decode the word back out; the stub-bus tests and bus
/// analyzers rely on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandWord(pub u32);

impl CommandWord {
    /// Reconstruct from a raw word (e.g. sniffed off the wire).
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw 32-bit value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Wire form: big-endian bytes, ready to transmit.
    #[must_use]
    pub const fn to_wire(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Opcode field, bits [26:24].
    #[must_use]
    pub const fn op(self) -> u8 {
        ((self.0 >> 24) & 0x7) as u8
    }

    /// Mode field, bits [21:20].
    #[must_use]
    pub const fn mode(self) -> u8 {
        ((self.0 >> 20) & 0x3) as u8
    }

    /// Station field, bits [19:18].
    #[must_use]
    pub const fn station(self) -> u8 {
        ((self.0 >> 18) & 0x3) as u8
    }

    /// Port field, bits [17:15].
    #[must_use]
    pub const fn port(self) -> u8 {
        ((self.0 >> 15) & 0x7) as u8
    }

    /// Byte-enable field, bits [13:10].
    #[must_use]
    pub const fn byte_mask(self) -> u8 {
        ((self.0 >> 10) & 0xF) as u8
    }

    /// Register byte offset recovered from the 10-bit word index.
    #[must_use]
    pub const fn register(self) -> u32 {
        (self.0 & 0x3FF) << 2
    }
}
