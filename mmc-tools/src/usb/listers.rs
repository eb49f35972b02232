//! Listing strategies, one per host platform.

use super::lsusb::{parse_lsusb, UsbDevice};
use super::{DeviceLister, FoundFn, Listing};
use crate::platform::Platform;
use mmc_error::{ToolError, ToolResult};
use mmc_hal::sysfs::block::BlockDeviceInfo;
use mmc_hal::{DriveOps, DriveType, ProcessOps, SysfsOps};
use std::time::Duration;

pub const LSUSB: &str = "lsusb";
pub const LSUSB_TIMEOUT: Duration = Duration::from_secs(30);

/// Walks drive letters A-Z and keeps the removable ones.
pub struct RemovableDriveLister<H> {
    hal: H,
}

impl<H: DriveOps> RemovableDriveLister<H> {
    pub fn new(hal: H) -> Self {
        Self { hal }
    }
}

impl<H: DriveOps> DeviceLister for RemovableDriveLister<H> {
    fn header(&self) -> Option<&'static str> {
        Some("Windows USB devices:")
    }

    fn list(&self, on_found: FoundFn<'_>) -> ToolResult<Listing> {
        let mask = self.hal.logical_drives()?;
        let mut roots = Vec::new();
        for (index, letter) in ('A'..='Z').enumerate() {
            if mask & (1 << index) == 0 {
                continue;
            }
            let root = format!("{letter}:\\");
            if self.hal.drive_type(&root)? == DriveType::Removable {
                on_found(&root)?;
                roots.push(root);
            }
        }
        Ok(Listing::Drives(roots))
    }
}

/// Runs `lsusb` once and parses the whole output.
pub struct UsbBusLister<H> {
    hal: H,
}

impl<H: ProcessOps> UsbBusLister<H> {
    pub fn new(hal: H) -> Self {
        Self { hal }
    }
}

impl<H: ProcessOps> DeviceLister for UsbBusLister<H> {
    fn list(&self, _on_found: FoundFn<'_>) -> ToolResult<Listing> {
        let output = self.hal.command_stdout(LSUSB, &[], LSUSB_TIMEOUT)?;
        let devices: Vec<UsbDevice> = parse_lsusb(&output);
        log::info!("lsusb reported {} devices", devices.len());
        Ok(Listing::Usb(devices))
    }
}

/// Removable block devices from sysfs.
pub struct SysfsRemovableLister<H> {
    hal: H,
}

impl<H: SysfsOps> SysfsRemovableLister<H> {
    pub fn new(hal: H) -> Self {
        Self { hal }
    }
}

impl<H: SysfsOps> DeviceLister for SysfsRemovableLister<H> {
    fn list(&self, _on_found: FoundFn<'_>) -> ToolResult<Listing> {
        let disks: Vec<BlockDeviceInfo> = self
            .hal
            .scan_block_devices()?
            .into_iter()
            .filter(|d| d.removable)
            .collect();
        log::info!("{} removable block devices", disks.len());
        Ok(Listing::Block(disks))
    }
}

/// Pick the lister for `platform`, backed by the host HAL.
pub fn lister_for(platform: &Platform) -> ToolResult<Box<dyn DeviceLister>> {
    match platform {
        #[cfg(windows)]
        Platform::Windows => Ok(Box::new(RemovableDriveLister::new(
            mmc_hal::WindowsHal::new(),
        ))),
        #[cfg(unix)]
        Platform::Linux => Ok(Box::new(UsbBusLister::new(mmc_hal::LinuxHal::new()))),
        #[cfg(unix)]
        Platform::LinuxSysfs => Ok(Box::new(SysfsRemovableLister::new(
            mmc_hal::LinuxHal::new(),
        ))),
        Platform::Unsupported(name) => Err(ToolError::UnsupportedPlatform(name.clone())),
        other => Err(ToolError::PlatformUnavailable(other.name().to_string())),
    }
}
