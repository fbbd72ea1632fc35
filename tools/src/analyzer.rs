//! External analyzer interface
//!
//! The actual diagnosis and recovery logic lives in an out-of-process tool.
//! This module owns that seam: a command template per flow, a hard deadline,
//! and a stdout parser. The concrete tool is swappable behind
//! [`ExternalAnalyzer`], which is what makes the API layer testable without
//! a real agent installed.

use std::env;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use heimdall_core::AnalyzerCommand;

use crate::invoker::{invoke, CommandSpec, InvokeError};

/// Probe result for one analyzer command
#[derive(Debug, Clone)]
pub struct CommandStatus {
    /// Rendered command line
    pub command: String,
    /// Whether the executable can be found
    pub available: bool,
}

/// Probe results for both flows
#[derive(Debug, Clone)]
pub struct AnalyzerAvailability {
    pub diagnose: CommandStatus,
    pub autonomous: CommandStatus,
}

/// One completed analyzer invocation
///
/// A nonzero exit code lands here as a regular result; only timeouts and
/// launch failures surface as [`InvokeError`].
#[derive(Debug, Clone)]
pub struct AnalyzerRun {
    /// Exit code (None when terminated by a signal)
    pub exit_code: Option<i32>,
    /// Stdout parsed as a JSON object, or the raw text wrapped as
    /// `{"output": ...}`
    pub report: Value,
    /// Raw standard output
    pub stdout: String,
    /// Raw standard error
    pub stderr: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl AnalyzerRun {
    /// Whether the tool reported success
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// The out-of-process analyzer, as the API layer sees it
#[async_trait]
pub trait ExternalAnalyzer: Send + Sync {
    /// Capability probe feeding the status endpoint and the demo fallback
    fn availability(&self) -> AnalyzerAvailability;

    /// Analyze the error payload staged at `payload`
    async fn diagnose(&self, payload: &Path) -> Result<AnalyzerRun, InvokeError>;

    /// Run the autonomous recovery flow against `deployment_url`
    async fn recover(&self, deployment_url: &str) -> Result<AnalyzerRun, InvokeError>;
}

/// Production implementation shelling out to the configured commands
pub struct CliAnalyzer {
    diagnose: AnalyzerCommand,
    autonomous: AnalyzerCommand,
}

impl CliAnalyzer {
    /// Create an analyzer from the two configured command templates
    pub fn new(diagnose: AnalyzerCommand, autonomous: AnalyzerCommand) -> Self {
        Self {
            diagnose,
            autonomous,
        }
    }

    async fn run(command: &AnalyzerCommand, target: &str) -> Result<AnalyzerRun, InvokeError> {
        let mut args = command.args.clone();
        args.push(target.to_string());

        let spec = CommandSpec {
            program: command.program.clone(),
            args,
            working_dir: None,
            timeout: Duration::from_secs(command.timeout_secs),
        };

        let output = invoke(&spec).await?;
        let report = parse_report(&output.stdout);

        Ok(AnalyzerRun {
            exit_code: output.exit_code,
            report,
            stdout: output.stdout,
            stderr: output.stderr,
            duration_ms: output.duration_ms,
        })
    }
}

#[async_trait]
impl ExternalAnalyzer for CliAnalyzer {
    fn availability(&self) -> AnalyzerAvailability {
        AnalyzerAvailability {
            diagnose: CommandStatus {
                command: self.diagnose.display(),
                available: command_available(&self.diagnose.program),
            },
            autonomous: CommandStatus {
                command: self.autonomous.display(),
                available: command_available(&self.autonomous.program),
            },
        }
    }

    async fn diagnose(&self, payload: &Path) -> Result<AnalyzerRun, InvokeError> {
        debug!("Diagnosing payload at {}", payload.display());
        Self::run(&self.diagnose, &payload.to_string_lossy()).await
    }

    async fn recover(&self, deployment_url: &str) -> Result<AnalyzerRun, InvokeError> {
        debug!("Running autonomous recovery against {}", deployment_url);
        Self::run(&self.autonomous, deployment_url).await
    }
}

/// Parse analyzer stdout
///
/// A JSON object passes through untouched; anything else (plain text, JSON
/// scalars or arrays) is treated as opaque tool output.
fn parse_report(stdout: &str) -> Value {
    match serde_json::from_str::<Value>(stdout.trim()) {
        Ok(value @ Value::Object(_)) => value,
        _ => json!({ "output": stdout }),
    }
}

/// Whether `program` resolves to an executable
///
/// Paths are checked directly; bare names are searched on PATH.
pub fn command_available(program: &str) -> bool {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.exists();
    }

    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| dir.join(program).is_file())
}
