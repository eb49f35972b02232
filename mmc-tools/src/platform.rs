//! Host platform detection for the USB enumerator.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// Drive letters flagged removable.
    Windows,
    /// `lsusb` bus listing.
    Linux,
    /// Removable block devices from `/sys/block`.
    LinuxSysfs,
    Unsupported(String),
}

impl Platform {
    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    /// Resolve a `--platform` value. `auto` (or empty) means the build host.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Self::detect(),
            "windows" | "nt" => Platform::Windows,
            "linux" | "lsusb" => Platform::Linux,
            "sysfs" => Platform::LinuxSysfs,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    /// Selector name, as accepted by `--platform`.
    pub fn name(&self) -> &str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::LinuxSysfs => "sysfs",
            Platform::Unsupported(name) => name,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows (removable drives)"),
            Platform::Linux => write!(f, "linux (lsusb)"),
            Platform::LinuxSysfs => write!(f, "linux (sysfs removable block devices)"),
            Platform::Unsupported(name) => write!(f, "unsupported ({name})"),
        }
    }
}
