//! Hardware access layer for the MMC bring-up tools.
//!
//! Everything that touches the host (opening raw devices, spawning `lsusb`,
//! asking Windows about drive letters, reading `/sys/block`) goes through the
//! traits in [`hal`], so the tools can be exercised against [`FakeHal`] in CI.

pub mod hal;
pub mod sysfs;

pub use hal::*;
pub use mmc_error::{HalError, HalResult};
