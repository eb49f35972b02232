//! Block device inventory from sysfs.

use crate::sysfs::block::BlockDeviceInfo;
use crate::HalResult;

pub trait SysfsOps {
    fn scan_block_devices(&self) -> HalResult<Vec<BlockDeviceInfo>>;
}
