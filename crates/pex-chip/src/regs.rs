//! Fixed register offsets visible through the I2C slave interface.
//!
//! The slave interface exposes each port's 4 KB configuration space. The
//! first 64 bytes follow the PCI configuration header, so identity lives at
//! the PCI-standard offsets; the rest are PEX-specific.

/// Vendor id (low 16 bits) and device id (high 16 bits).
pub const PCI_VENDOR_ID: u32 = 0x000;

/// Class code / revision id; revision is the low byte.
pub const PCI_CLASS_REVISION: u32 = 0x008;

/// Port-enable status. One bit per port slot; AND into the catalog default
/// to get the ports actually enabled by straps/EEPROM.
pub const PORT_ENABLE_STATUS: u32 = 0x314;

/// Management port configuration (raw value only — no field decode here).
pub const MGMT_PORT_CONFIG: u32 = 0x354;

/// Virtual-switch VLS mask (raw value only).
pub const VS_VLS_MASK: u32 = 0x358;

/// Per-port debug/link status, read per (station, port, mode).
pub const PORT_DEBUG_STATUS: u32 = 0xF70;

/// Size of one port's register space in bytes.
pub const REG_SPACE_SIZE: u32 = 4096;

/// Port debug status words with a known meaning, used by status displays.
pub mod link {
    /// Link up, trained at full width.
    pub const UP: u32 = 0x8000_0008;
    /// Link up, no lanes trained.
    pub const UP_NO_LANES: u32 = 0x8000_0000;
    /// Port down / inactive.
    pub const DOWN: u32 = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_inside_register_space() {
        for off in [
            PCI_VENDOR_ID,
            PCI_CLASS_REVISION,
            PORT_ENABLE_STATUS,
            MGMT_PORT_CONFIG,
            VS_VLS_MASK,
            PORT_DEBUG_STATUS,
        ] {
            assert!(off < REG_SPACE_SIZE);
            assert_eq!(off % 4, 0, "registers are word-aligned");
        }
    }
}
