//! Catalog of known PEX87xx chip families.
//!
//! Each entry describes one part's topology as the I2C slave interface sees
//! it: which port slots exist, how ports group into stations, and which
//! command dialect it speaks. Entries are static data; a live device narrows
//! the default port bitmap with a runtime read of the port-enable register.

use crate::command::CommandDialect;

/// PLX Technology (the original PEX87xx vendor).
pub const VENDOR_PLX: u16 = 0x10B5;
/// Broadcom (acquired PLX).
pub const VENDOR_BROADCOM: u16 = 0x14E4;
/// LSI / Avago-era id found on some parts.
pub const VENDOR_LSI: u16 = 0x1000;

/// Vendor ids a PEX87xx part may identify with.
pub const KNOWN_VENDORS: &[u16] = &[VENDOR_PLX, VENDOR_BROADCOM, VENDOR_LSI];

/// Is `vendor` a silicon vendor we accept during identification?
#[must_use]
pub fn is_known_vendor(vendor: u16) -> bool {
    KNOWN_VENDORS.contains(&vendor)
}

/// Topology metadata for one chip family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipFamily {
    /// PCI device id the part identifies with.
    pub device_id: u16,
    /// Marketing name, e.g. `"PEX8724"`.
    pub name: &'static str,
    /// Default port bitmap — one bit per physical port slot, up to 24 bits.
    pub ports: u32,
    /// Number of stations.
    pub stations: u8,
    /// Valid station-index bits.
    pub station_mask: u8,
    /// Port slots per station.
    pub ports_per_station: u8,
    /// Command-word dialect the part speaks.
    pub dialect: CommandDialect,
}

impl ChipFamily {
    /// Is `port` present in the family's default port bitmap?
    #[must_use]
    pub const fn has_port(&self, port: u8) -> bool {
        port < 32 && self.ports & (1 << port) != 0
    }
}

macro_rules! family {
    ($id:literal, $name:literal, $ports:literal, $stns:literal, $mask:literal, $pps:literal) => {
        ChipFamily {
            device_id: $id,
            name: $name,
            ports: $ports,
            stations: $stns,
            station_mask: $mask,
            ports_per_station: $pps,
            dialect: CommandDialect::Pex87xx,
        }
    };
}

/// Every chip family this toolkit can identify.
pub const KNOWN_DEVICES: &[ChipFamily] = &[
    family!(0x8700, "PEX8700", 0x0000_000F, 1, 0x1, 4),
    family!(0x8712, "PEX8712", 0x0000_000F, 1, 0x1, 4),
    family!(0x8713, "PEX8713", 0x0000_3F3F, 2, 0x3, 8),
    family!(0x8714, "PEX8714", 0x0000_001F, 1, 0x1, 5),
    family!(0x8716, "PEX8716", 0x0000_000F, 1, 0x1, 4),
    family!(0x8717, "PEX8717", 0x0000_3F3F, 2, 0x3, 8),
    family!(0x8718, "PEX8718", 0x0000_000F, 1, 0x1, 4),
    family!(0x8723, "PEX8723", 0x0000_070F, 2, 0x3, 8),
    family!(0x8724, "PEX8724", 0x0000_070F, 2, 0x3, 8),
    family!(0x8725, "PEX8725", 0x0000_3F3F, 2, 0x3, 8),
    family!(0x8732, "PEX8732", 0x0000_0F0F, 2, 0x3, 8),
    family!(0x8733, "PEX8733", 0x003F_3F3F, 3, 0x7, 8),
    family!(0x8734, "PEX8734", 0x0000_00FF, 2, 0x3, 4),
    family!(0x8747, "PEX8747", 0x0003_0301, 3, 0x7, 8),
    family!(0x8748, "PEX8748", 0x000F_0F0F, 3, 0x7, 8),
    family!(0x8749, "PEX8749", 0x003F_3F3F, 3, 0x7, 8),
    family!(0x8750, "PEX8750", 0x0000_0FFF, 3, 0x7, 4),
    family!(0x8764, "PEX8764", 0x0000_FFFF, 4, 0xF, 4),
    family!(0x8780, "PEX8780", 0x0000_FFFF, 5, 0x1F, 4),
    family!(0x8796, "PEX8796", 0x00FF_FFFF, 6, 0x3F, 4),
];

/// Look up a chip family by PCI device id.
#[must_use]
pub fn lookup(device_id: u16) -> Option<&'static ChipFamily> {
    KNOWN_DEVICES.iter().find(|f| f.device_id == device_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_part() {
        let fam = lookup(0x8724).expect("PEX8724 in catalog");
        assert_eq!(fam.name, "PEX8724");
        assert_eq!(fam.ports, 0x0000_070F);
        assert_eq!(fam.stations, 2);
        assert_eq!(fam.ports_per_station, 8);
    }

    #[test]
    fn lookup_unknown_part() {
        assert!(lookup(0x9797).is_none());
    }

    #[test]
    fn catalog_entries_are_sane() {
        for fam in KNOWN_DEVICES {
            assert!(fam.ports != 0, "{} has no ports", fam.name);
            assert!(fam.ports <= 0x00FF_FFFF, "{} exceeds 24 port slots", fam.name);
            assert!(fam.stations >= 1);
            assert!(fam.ports_per_station >= 1);
            // Every valid station index fits the mask.
            assert!(fam.station_mask >= fam.stations - 1);
            // Port slots never exceed the station grid.
            let highest = 32 - fam.ports.leading_zeros();
            assert!(
                highest <= u32::from(fam.stations) * u32::from(fam.ports_per_station),
                "{} port bitmap exceeds station grid",
                fam.name
            );
        }
    }

    #[test]
    fn device_ids_unique() {
        for (i, a) in KNOWN_DEVICES.iter().enumerate() {
            for b in &KNOWN_DEVICES[i + 1..] {
                assert_ne!(a.device_id, b.device_id);
            }
        }
    }

    #[test]
    fn vendor_allow_list() {
        assert!(is_known_vendor(0x10B5));
        assert!(is_known_vendor(0x14E4));
        assert!(is_known_vendor(0x1000));
        assert!(!is_known_vendor(0x8086));
    }
}
