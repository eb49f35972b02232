//! Raw device access.

use crate::HalResult;
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Anything the probe can write, rewind and read back.
pub trait DeviceIo: Read + Write + Seek {}

impl<T: Read + Write + Seek + ?Sized> DeviceIo for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Block,
    Regular,
    Other,
}

/// Block device operations trait.
pub trait BlockOps {
    /// Classify the node at `device` without opening it.
    fn device_kind(&self, device: &Path) -> HalResult<DeviceKind>;

    /// Open an existing device for reading and writing. Never creates the path.
    fn open_rw(&self, device: &Path) -> HalResult<Box<dyn DeviceIo>>;

    /// Size of the medium in bytes.
    ///
    /// Not a seek on an open handle: raw Windows drives report an end-of-file
    /// of 0 there.
    fn capacity(&self, device: &Path) -> HalResult<u64>;
}

/// `\\.\PhysicalDriveN` style paths, which only accept whole-sector I/O.
pub fn is_raw_windows_drive(device: &Path) -> bool {
    device.to_string_lossy().starts_with(r"\\.\")
}
