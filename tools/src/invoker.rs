//! Subprocess invocation with enforced deadlines
//!
//! Spawns external commands with captured output. A timeout is a hard
//! deadline: the child is killed, never left running. A nonzero exit code
//! is a normal result for the caller to inspect, not an error.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Command to execute
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Executable to launch
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Working directory (defaults to the current dir)
    pub working_dir: Option<PathBuf>,
    /// Hard deadline
    pub timeout: Duration,
}

/// Captured result of a completed subprocess
#[derive(Debug, Clone)]
pub struct InvokeOutput {
    /// Exit code (None when terminated by a signal)
    pub exit_code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl InvokeOutput {
    /// Whether the process reported success
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Invocation failures, distinct from a nonzero exit
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Deadline exceeded; the process has been terminated
    #[error("Command '{program}' timed out after {timeout_secs}s")]
    Timeout { program: String, timeout_secs: u64 },

    /// The executable could not be launched
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process started but its output could not be collected
    #[error("Failed to collect output from '{program}': {source}")]
    Output {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Run a command to completion under its deadline
///
/// Stdout and stderr are captured separately. On timeout the child is
/// dropped with kill-on-drop set, which terminates the process.
pub async fn invoke(spec: &CommandSpec) -> Result<InvokeOutput, InvokeError> {
    let start = std::time::Instant::now();
    debug!("Invoking '{}' with args {:?}", spec.program, spec.args);

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(ref dir) = spec.working_dir {
        cmd.current_dir(dir);
    }

    let child = cmd.spawn().map_err(|source| InvokeError::Spawn {
        program: spec.program.clone(),
        source,
    })?;

    let output = match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(InvokeError::Output {
                program: spec.program.clone(),
                source,
            })
        }
        Err(_) => {
            warn!(
                "Command '{}' exceeded its {}s deadline, killing it",
                spec.program,
                spec.timeout.as_secs()
            );
            return Err(InvokeError::Timeout {
                program: spec.program.clone(),
                timeout_secs: spec.timeout.as_secs(),
            });
        }
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    let exit_code = output.status.code();

    let result = InvokeOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration_ms,
    };

    if output.status.success() {
        info!(
            "Command '{}' completed successfully in {}ms",
            spec.program, duration_ms
        );
    } else {
        warn!(
            "Command '{}' exited with {:?} in {}ms",
            spec.program, exit_code, duration_ms
        );
    }

    Ok(result)
}
