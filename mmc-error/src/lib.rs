use std::io;
use thiserror::Error;

pub type HalResult<T> = Result<T, HalError>;
pub type ToolResult<T> = Result<T, ToolError>;

#[derive(Error, Debug)]
pub enum HalError {
    #[error("OS error: permission denied on {0}")]
    PermissionDenied(String),

    #[error("OS error: no such device {0}")]
    DeviceNotFound(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command failed: {program} (exit={code:?}): {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command timed out: {program} after {timeout_secs}s")]
    CommandTimeout { program: String, timeout_secs: u64 },

    #[error("OS error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Hal(#[from] HalError),

    #[error("OS error: {0}")]
    Io(#[from] io::Error),

    #[error("{device} i/o failed: wrote {written} bytes, read back {read} bytes that do not match")]
    ProbeMismatch {
        device: String,
        written: usize,
        read: usize,
    },

    #[error("Unknown OS, exiting ({0})")]
    UnsupportedPlatform(String),

    #[error("{0} listing is not available in this build")]
    PlatformUnavailable(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ToolError {
    /// True for failures that originate in the operating system rather than
    /// in the tool's own checks.
    pub fn is_os_error(&self) -> bool {
        match self {
            ToolError::Io(_) => true,
            ToolError::Hal(err) => !matches!(err, HalError::Parse(_)),
            _ => false,
        }
    }
}
