//! Block device discovery through sysfs.

use crate::{HalError, HalResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const SYS_BLOCK_ROOT: &str = "/sys/block";

/// Reads the block device size from `<sysfs dir>/size`.
///
/// The `size` file is expressed in 512-byte sectors.
pub fn block_device_size_bytes(sys_block_dev_dir: &Path) -> HalResult<u64> {
    let sectors_str = fs::read_to_string(sys_block_dev_dir.join("size"))?;
    let sectors: u64 = sectors_str.trim().parse().map_err(|_| {
        HalError::Parse(format!(
            "bad sector count {:?} in {}",
            sectors_str.trim(),
            sys_block_dev_dir.display()
        ))
    })?;
    Ok(sectors.saturating_mul(512))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDeviceInfo {
    pub name: String,
    pub dev_path: PathBuf,
    pub size_bytes: u64,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub removable: bool,
}

pub fn scan_block_devices_in(sys_block_root: &Path) -> HalResult<Vec<BlockDeviceInfo>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(sys_block_root)?.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if should_skip_block_device(&name) {
            continue;
        }
        let sysfs_path = sys_block_root.join(&name);
        let size_bytes = match block_device_size_bytes(&sysfs_path) {
            Ok(v) => v,
            Err(err) => {
                log::debug!("skipping {}: {}", name, err);
                continue;
            }
        };
        // Empty card readers report zero sectors.
        if size_bytes == 0 {
            continue;
        }

        let removable = read_trimmed(sysfs_path.join("removable"))
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            == 1;

        out.push(BlockDeviceInfo {
            dev_path: PathBuf::from("/dev").join(&name),
            vendor: read_trimmed(sysfs_path.join("device/vendor")),
            model: read_trimmed(sysfs_path.join("device/model")),
            name,
            size_bytes,
            removable,
        });
    }
    // read_dir order is unspecified.
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn read_trimmed(path: PathBuf) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn should_skip_block_device(name: &str) -> bool {
    name.starts_with("loop")
        || name.starts_with("ram")
        || name.starts_with("zram")
        || name.starts_with("dm-")
        || name.starts_with("md")
        || name.starts_with("sr")
}
