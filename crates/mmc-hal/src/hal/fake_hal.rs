//! Fake HAL implementation for testing.
//!
//! This implementation records all operations without touching the host,
//! allowing CI-safe testing without root privileges, USB hardware or a
//! sacrificial block device.

use super::{BlockOps, DeviceIo, DeviceKind, DriveOps, DriveType, ProcessOps, SysfsOps};
use crate::sysfs::block::BlockDeviceInfo;
use crate::{HalError, HalResult};
use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    DeviceKind {
        device: PathBuf,
    },
    OpenDevice {
        device: PathBuf,
    },
    Capacity {
        device: PathBuf,
    },
    Command {
        program: String,
        args: Vec<String>,
        timeout_secs: u64,
    },
    LogicalDrives,
    DriveType {
        root: String,
    },
    ScanBlockDevices,
}

#[derive(Debug, Clone)]
enum ScriptedCommand {
    Output { code: i32, stdout: String, stderr: String },
    NotFound,
}

/// In-memory stand-in for a raw device of fixed capacity.
///
/// Clones share the same backing store, so a test can keep one handle and
/// inspect what the code under test wrote through another.
#[derive(Debug, Clone)]
pub struct FakeDevice {
    data: Arc<Mutex<Vec<u8>>>,
    pos: u64,
    drops_writes: bool,
    hides_length: bool,
}

impl FakeDevice {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Arc::new(Mutex::new(vec![0; capacity])),
            pos: 0,
            drops_writes: false,
            hides_length: false,
        }
    }

    /// A device that acknowledges writes but never stores them.
    pub fn dropping_writes(capacity: usize) -> Self {
        Self {
            drops_writes: true,
            ..Self::new(capacity)
        }
    }

    /// A device whose handle reports an end-of-file of 0, like a raw Windows
    /// drive, while reads and writes still reach the full capacity.
    pub fn reporting_zero_length(capacity: usize) -> Self {
        Self {
            hides_length: true,
            ..Self::new(capacity)
        }
    }

    pub fn len(&self) -> u64 {
        self.data.lock().unwrap().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }
}

impl Read for FakeDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.lock().unwrap();
        let start = (self.pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for FakeDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut data = self.data.lock().unwrap();
        let start = (self.pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        if n == 0 && !buf.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "No space left on device",
            ));
        }
        if !self.drops_writes {
            data[start..start + n].copy_from_slice(&buf[..n]);
        }
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for FakeDevice {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = if self.hides_length {
            0
        } else {
            self.data.lock().unwrap().len() as i64
        };
        let target = match pos {
            SeekFrom::Start(off) => off as i64,
            SeekFrom::End(off) => len + off,
            SeekFrom::Current(off) => self.pos as i64 + off,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative position",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}

/// Shared state for FakeHal operations.
#[derive(Debug, Default)]
struct FakeHalState {
    /// All operations that were recorded
    operations: Vec<Operation>,
    devices: HashMap<PathBuf, (DeviceKind, FakeDevice)>,
    open_errors: HashMap<PathBuf, io::ErrorKind>,
    commands: HashMap<String, ScriptedCommand>,
    drive_mask: u32,
    drive_types: HashMap<String, DriveType>,
    block_devices: Vec<BlockDeviceInfo>,
}

/// Fake HAL implementation that records operations without executing them.
///
/// Unknown devices are reported as missing, unknown programs as not found,
/// and the drive table starts empty.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

impl FakeHal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device node backed by `device`.
    pub fn with_device(self, path: impl Into<PathBuf>, kind: DeviceKind, device: FakeDevice) -> Self {
        self.state
            .lock()
            .unwrap()
            .devices
            .insert(path.into(), (kind, device));
        self
    }

    /// Make opening `path` fail with `kind` while it still stats fine, as a
    /// device node without read/write permission does.
    pub fn with_open_error(self, path: impl Into<PathBuf>, kind: io::ErrorKind) -> Self {
        self.state
            .lock()
            .unwrap()
            .open_errors
            .insert(path.into(), kind);
        self
    }

    /// Script a successful run of `program` printing `stdout`.
    pub fn with_command_output(self, program: &str, stdout: &str) -> Self {
        self.script(
            program,
            ScriptedCommand::Output {
                code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        )
    }

    /// Script a run of `program` that exits with `code`.
    pub fn with_command_failure(self, program: &str, code: i32, stderr: &str) -> Self {
        self.script(
            program,
            ScriptedCommand::Output {
                code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        )
    }

    /// Make `program` behave as if it is not installed.
    pub fn without_command(self, program: &str) -> Self {
        self.script(program, ScriptedCommand::NotFound)
    }

    /// Add a drive letter (`'A'..='Z'`) of the given type.
    pub fn with_drive(self, letter: char, kind: DriveType) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let index = (letter.to_ascii_uppercase() as u8).wrapping_sub(b'A');
            if index < 26 {
                state.drive_mask |= 1 << index;
                state
                    .drive_types
                    .insert(format!("{}:\\", letter.to_ascii_uppercase()), kind);
            }
        }
        self
    }

    pub fn with_block_device(self, info: BlockDeviceInfo) -> Self {
        self.state.lock().unwrap().block_devices.push(info);
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().unwrap().operations.clone()
    }

    /// Get the number of operations recorded.
    pub fn operation_count(&self) -> usize {
        self.state.lock().unwrap().operations.len()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.state.lock().unwrap().operations.iter().any(check)
    }

    /// Clear all recorded operations.
    pub fn clear(&self) {
        self.state.lock().unwrap().operations.clear();
    }

    fn script(self, program: &str, command: ScriptedCommand) -> Self {
        self.state
            .lock()
            .unwrap()
            .commands
            .insert(program.to_string(), command);
        self
    }

    fn record_operation(&self, op: Operation) {
        self.state.lock().unwrap().operations.push(op);
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

impl BlockOps for FakeHal {
    fn device_kind(&self, device: &Path) -> HalResult<DeviceKind> {
        self.record_operation(Operation::DeviceKind {
            device: device.to_path_buf(),
        });
        let state = self.state.lock().unwrap();
        match state.devices.get(device) {
            Some((kind, _)) => Ok(*kind),
            None => Err(HalError::DeviceNotFound(device.display().to_string())),
        }
    }

    fn open_rw(&self, device: &Path) -> HalResult<Box<dyn DeviceIo>> {
        log::info!("FAKE HAL: open {} read/write", device.display());
        self.record_operation(Operation::OpenDevice {
            device: device.to_path_buf(),
        });
        let state = self.state.lock().unwrap();
        let dev = state.lookup(device)?;
        let mut handle = dev.clone();
        handle.pos = 0;
        Ok(Box::new(handle))
    }

    fn capacity(&self, device: &Path) -> HalResult<u64> {
        self.record_operation(Operation::Capacity {
            device: device.to_path_buf(),
        });
        let state = self.state.lock().unwrap();
        Ok(state.lookup(device)?.len())
    }
}

impl FakeHalState {
    fn lookup(&self, device: &Path) -> HalResult<&FakeDevice> {
        if let Some(kind) = self.open_errors.get(device) {
            return Err(HalError::Io(io::Error::from(*kind)));
        }
        match self.devices.get(device) {
            Some((_, dev)) => Ok(dev),
            None => Err(HalError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "No such file or directory",
            ))),
        }
    }
}

impl ProcessOps for FakeHal {
    fn command_output(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<Output> {
        log::info!("FAKE HAL: run {} {}", program, args.join(" "));
        self.record_operation(Operation::Command {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            timeout_secs: timeout.as_secs(),
        });

        let scripted = self.state.lock().unwrap().commands.get(program).cloned();
        match scripted {
            Some(ScriptedCommand::Output {
                code,
                stdout,
                stderr,
            }) => Ok(Output {
                status: exit_status(code),
                stdout: stdout.into_bytes(),
                stderr: stderr.into_bytes(),
            }),
            Some(ScriptedCommand::NotFound) | None => {
                Err(HalError::CommandNotFound(program.to_string()))
            }
        }
    }
}

impl DriveOps for FakeHal {
    fn logical_drives(&self) -> HalResult<u32> {
        self.record_operation(Operation::LogicalDrives);
        Ok(self.state.lock().unwrap().drive_mask)
    }

    fn drive_type(&self, root: &str) -> HalResult<DriveType> {
        self.record_operation(Operation::DriveType {
            root: root.to_string(),
        });
        let state = self.state.lock().unwrap();
        Ok(state
            .drive_types
            .get(root)
            .copied()
            .unwrap_or(DriveType::NoRootDir))
    }
}

impl SysfsOps for FakeHal {
    fn scan_block_devices(&self) -> HalResult<Vec<BlockDeviceInfo>> {
        self.record_operation(Operation::ScanBlockDevices);
        Ok(self.state.lock().unwrap().block_devices.clone())
    }
}
