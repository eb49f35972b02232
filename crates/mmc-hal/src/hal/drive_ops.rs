//! Logical drive queries (drive letters and their media type).

use crate::HalResult;

/// Media classification reported for a drive root, in `GetDriveType` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveType {
    Unknown,
    NoRootDir,
    Removable,
    Fixed,
    Remote,
    CdRom,
    RamDisk,
}

impl DriveType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => DriveType::NoRootDir,
            2 => DriveType::Removable,
            3 => DriveType::Fixed,
            4 => DriveType::Remote,
            5 => DriveType::CdRom,
            6 => DriveType::RamDisk,
            _ => DriveType::Unknown,
        }
    }
}

pub trait DriveOps {
    /// Bitmask of present drives; bit 0 is `A:`.
    fn logical_drives(&self) -> HalResult<u32>;

    /// Media type of a drive root such as `E:\`.
    fn drive_type(&self, root: &str) -> HalResult<DriveType>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_maps_removable() {
        assert_eq!(DriveType::from_raw(2), DriveType::Removable);
        assert_eq!(DriveType::from_raw(3), DriveType::Fixed);
    }

    #[test]
    fn from_raw_unknown_for_out_of_range() {
        assert_eq!(DriveType::from_raw(0), DriveType::Unknown);
        assert_eq!(DriveType::from_raw(42), DriveType::Unknown);
    }
}
