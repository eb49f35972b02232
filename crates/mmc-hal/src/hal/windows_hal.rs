//! Windows HAL implementation (drive letters via `fileapi`).

use super::{is_raw_windows_drive, BlockOps, DeviceIo, DeviceKind, DriveOps, DriveType};
use crate::{HalError, HalResult};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::mem;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::io::AsRawHandle;
use std::path::Path;
use std::ptr;
use winapi::shared::minwindef::{DWORD, LPVOID};
use winapi::um::fileapi::{GetDriveTypeW, GetLogicalDrives};
use winapi::um::ioapiset::DeviceIoControl;
use winapi::um::winioctl::{GET_LENGTH_INFORMATION, IOCTL_DISK_GET_LENGTH_INFO};

#[derive(Debug, Clone, Default)]
pub struct WindowsHal;

impl WindowsHal {
    pub fn new() -> Self {
        Self
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

impl DriveOps for WindowsHal {
    fn logical_drives(&self) -> HalResult<u32> {
        let mask = unsafe { GetLogicalDrives() };
        if mask == 0 {
            return Err(HalError::Io(io::Error::last_os_error()));
        }
        log::debug!("Logical drive mask {:#010b}", mask);
        Ok(mask)
    }

    fn drive_type(&self, root: &str) -> HalResult<DriveType> {
        let wide = to_wide(root);
        let raw = unsafe { GetDriveTypeW(wide.as_ptr()) };
        let kind = DriveType::from_raw(raw);
        log::debug!("{} is {:?}", root, kind);
        Ok(kind)
    }
}

impl BlockOps for WindowsHal {
    fn device_kind(&self, device: &Path) -> HalResult<DeviceKind> {
        // Physical drive paths (\\.\PhysicalDriveN) have no file metadata.
        match fs::metadata(device) {
            Ok(meta) if meta.is_file() => Ok(DeviceKind::Regular),
            Ok(_) => Ok(DeviceKind::Other),
            Err(_) if is_raw_windows_drive(device) => Ok(DeviceKind::Block),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(HalError::DeviceNotFound(device.display().to_string()))
            }
            Err(err) => Err(HalError::Io(err)),
        }
    }

    fn open_rw(&self, device: &Path) -> HalResult<Box<dyn DeviceIo>> {
        log::info!("Opening {} read/write", device.display());
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(device)?;
        Ok(Box::new(file))
    }

    fn capacity(&self, device: &Path) -> HalResult<u64> {
        if !is_raw_windows_drive(device) {
            return Ok(fs::metadata(device)?.len());
        }

        let file = fs::File::open(device)?;
        let mut info: GET_LENGTH_INFORMATION = unsafe { mem::zeroed() };
        let mut returned: DWORD = 0;
        let ok = unsafe {
            DeviceIoControl(
                file.as_raw_handle() as _,
                IOCTL_DISK_GET_LENGTH_INFO,
                ptr::null_mut(),
                0,
                &mut info as *mut GET_LENGTH_INFORMATION as LPVOID,
                mem::size_of::<GET_LENGTH_INFORMATION>() as DWORD,
                &mut returned,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(HalError::Io(io::Error::last_os_error()));
        }
        let len = unsafe { *info.Length.QuadPart() } as u64;
        log::debug!("{} reports {} bytes", device.display(), len);
        Ok(len)
    }
}
