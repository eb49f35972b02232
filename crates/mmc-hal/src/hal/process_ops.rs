//! Process execution helpers.
//!
//! External commands are considered "world-touching" and must go through the HAL so we can
//! test the listers without spawning real processes.

use crate::{HalError, HalResult};
use std::process::Output;
use std::time::Duration;

/// Process execution trait (external command runner).
pub trait ProcessOps {
    fn command_output(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<Output>;

    /// Run a command and return its stdout, treating a non-zero exit as an error.
    fn command_stdout(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<String> {
        let output = self.command_output(program, args, timeout)?;
        if !output.status.success() {
            return Err(output_failed(program, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

pub(crate) fn output_failed(program: &str, output: &Output) -> HalError {
    HalError::CommandFailed {
        program: program.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}
