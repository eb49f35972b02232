//! Hardware bring-up helpers for the S4 MMC test bench.
//!
//! `mmc-tools` holds the logic behind the two bench binaries:
//! `mmc-probe` (raw device write/read round-trip) and `usb-enum`
//! (removable USB storage listing). All host access goes through `mmc-hal`.

pub mod cli;
pub mod logging;
pub mod platform;
pub mod probe;
pub mod usb;

/// HAL backing the binaries on this build target.
#[cfg(unix)]
pub type HostHal = mmc_hal::LinuxHal;
#[cfg(windows)]
pub type HostHal = mmc_hal::WindowsHal;
