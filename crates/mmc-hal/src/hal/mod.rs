//! HAL trait definitions and implementations.
//!
//! This module defines the traits for host operations and provides real
//! (`LinuxHal`, `WindowsHal`) and fake (`FakeHal`) implementations.

pub mod block_ops;
pub mod drive_ops;
pub mod fake_hal;
#[cfg(unix)]
pub mod linux_hal;
pub mod process_ops;
pub mod sysfs_ops;
#[cfg(windows)]
pub mod windows_hal;

pub use block_ops::{is_raw_windows_drive, BlockOps, DeviceIo, DeviceKind};
pub use drive_ops::{DriveOps, DriveType};
pub use fake_hal::{FakeDevice, FakeHal, Operation};
#[cfg(unix)]
pub use linux_hal::LinuxHal;
pub use process_ops::ProcessOps;
pub use sysfs_ops::SysfsOps;
#[cfg(windows)]
pub use windows_hal::WindowsHal;
