//! Linux HAL implementation using real system calls.

use super::{BlockOps, DeviceIo, DeviceKind, ProcessOps, SysfsOps};
use crate::sysfs::block::{scan_block_devices_in, BlockDeviceInfo, SYS_BLOCK_ROOT};
use crate::{HalError, HalResult};
use nix::sys::stat::{stat, SFlag};
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Real HAL implementation for Linux systems.
#[derive(Debug, Clone, Default)]
pub struct LinuxHal;

impl LinuxHal {
    pub fn new() -> Self {
        Self
    }
}

fn map_command_err(program: &str, err: std::io::Error) -> HalError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return HalError::CommandNotFound(program.to_string());
    }
    HalError::Io(err)
}

fn map_nix_err(device: &Path, err: nix::errno::Errno) -> HalError {
    use nix::errno::Errno;
    match err {
        Errno::ENOENT | Errno::ENXIO => HalError::DeviceNotFound(device.display().to_string()),
        Errno::EACCES | Errno::EPERM => HalError::PermissionDenied(device.display().to_string()),
        other => HalError::Io(other.into()),
    }
}

fn output_with_timeout(program: &str, cmd: &mut Command, timeout: Duration) -> HalResult<Output> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| map_command_err(program, e))?;

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    // Drain pipes concurrently to avoid deadlocks on large output.
    let stdout_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout.take() {
            let _ = out.read_to_end(&mut buf);
        }
        buf
    });
    let stderr_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr.take() {
            let _ = err.read_to_end(&mut buf);
        }
        buf
    });

    let status = match child.wait_timeout(timeout).map_err(HalError::Io)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            let _ = stdout_handle.join();
            let _ = stderr_handle.join();
            return Err(HalError::CommandTimeout {
                program: program.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

impl BlockOps for LinuxHal {
    fn device_kind(&self, device: &Path) -> HalResult<DeviceKind> {
        let st = stat(device).map_err(|e| map_nix_err(device, e))?;
        let fmt = SFlag::from_bits_truncate(st.st_mode & SFlag::S_IFMT.bits());
        let kind = if fmt == SFlag::S_IFBLK {
            DeviceKind::Block
        } else if fmt == SFlag::S_IFREG {
            DeviceKind::Regular
        } else {
            DeviceKind::Other
        };
        log::debug!("{} is {:?}", device.display(), kind);
        Ok(kind)
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
        let mut file = fs::File::open(device)?;
        let len = file.seek(SeekFrom::End(0))?;
        log::debug!("{} reports {} bytes", device.display(), len);
        Ok(len)
    }
}

impl ProcessOps for LinuxHal {
    fn command_output(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<Output> {
        log::debug!("Running {} {}", program, args.join(" "));
        let mut cmd = Command::new(program);
        cmd.args(args);
        output_with_timeout(program, &mut cmd, timeout)
    }
}

impl SysfsOps for LinuxHal {
    fn scan_block_devices(&self) -> HalResult<Vec<BlockDeviceInfo>> {
        scan_block_devices_in(Path::new(SYS_BLOCK_ROOT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn device_kind_classifies_regular_files() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("card.img");
        fs::write(&image, [0u8; 512]).unwrap();

        let hal = LinuxHal::new();
        assert_eq!(hal.device_kind(&image).unwrap(), DeviceKind::Regular);
    }

    #[test]
    fn device_kind_missing_path_is_device_not_found() {
        let dir = tempdir().unwrap();
        let err = LinuxHal::new()
            .device_kind(&dir.path().join("sdz"))
            .unwrap_err();
        assert!(matches!(err, HalError::DeviceNotFound(_)));
    }

    #[test]
    fn device_kind_character_device_is_other() {
        let kind = LinuxHal::new().device_kind(Path::new("/dev/null")).unwrap();
        assert_eq!(kind, DeviceKind::Other);
    }

    #[test]
    fn open_rw_never_creates() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.img");
        let Err(err) = LinuxHal::new().open_rw(&missing) else {
            panic!("opened a missing path");
        };
        assert!(matches!(err, HalError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
        assert!(!missing.exists());
    }

    #[test]
    fn open_rw_handle_round_trips() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("card.img");
        fs::write(&image, [0u8; 64]).unwrap();

        let mut dev = LinuxHal::new().open_rw(&image).unwrap();
        dev.write_all(b"hello").unwrap();
        dev.seek(SeekFrom::Start(0)).unwrap();
        let mut buf = [0u8; 5];
        dev.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn capacity_is_the_image_length() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("card.img");
        fs::write(&image, vec![0u8; 4096]).unwrap();

        assert_eq!(LinuxHal::new().capacity(&image).unwrap(), 4096);
    }

    #[test]
    fn capacity_of_missing_path_is_an_error() {
        let dir = tempdir().unwrap();
        let err = LinuxHal::new()
            .capacity(&dir.path().join("sdz"))
            .unwrap_err();
        assert!(matches!(err, HalError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn command_stdout_captures_output() {
        let out = LinuxHal::new()
            .command_stdout("sh", &["-c", "echo hello"], Duration::from_secs(10))
            .unwrap();
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn command_stdout_reports_non_zero_exit() {
        let err = LinuxHal::new()
            .command_stdout("sh", &["-c", "echo nope >&2; exit 3"], Duration::from_secs(10))
            .unwrap_err();
        match err {
            HalError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_command_not_found() {
        let err = LinuxHal::new()
            .command_output("definitely-not-a-real-lsusb", &[], Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, HalError::CommandNotFound(_)));
    }

    #[test]
    fn slow_command_times_out() {
        let err = LinuxHal::new()
            .command_output("sleep", &["5"], Duration::from_millis(100))
            .unwrap_err();
        assert!(matches!(err, HalError::CommandTimeout { .. }));
    }
}
