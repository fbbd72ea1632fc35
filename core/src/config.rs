//! Configuration Management Module
//!
//! File-based configuration with environment variable overrides. The
//! precedence is: CLI flags (applied by the binary) over environment over
//! file over defaults. Unlike the stats file, a config file that exists but
//! does not parse is a hard error — it is operator input, not runtime state.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// External analyzer command template
///
/// The payload path (diagnosis) or deployment URL (recovery) is appended as
/// the final argument at invocation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerCommand {
    /// Executable to launch
    pub program: String,
    /// Leading arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Hard deadline in seconds
    pub timeout_secs: u64,
}

impl AnalyzerCommand {
    /// Rendered command line, for status reporting
    pub fn display(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Directory holding the static dashboard
    pub public_dir: PathBuf,
    /// Stats file; lives inside `public_dir` so the frontend can fetch it
    pub stats_file: PathBuf,
    /// Diagnosis flow command (short deadline)
    pub diagnose: AnalyzerCommand,
    /// Autonomous recovery flow command (long deadline)
    pub autonomous: AnalyzerCommand,
    /// Always answer with canned demo payloads
    pub demo_mode: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            public_dir: PathBuf::from("public"),
            stats_file: PathBuf::from("public/stats.json"),
            diagnose: AnalyzerCommand {
                program: "python3".to_string(),
                args: vec![
                    "-m".to_string(),
                    "autodebugger".to_string(),
                    "analyze".to_string(),
                ],
                timeout_secs: 30,
            },
            autonomous: AnalyzerCommand {
                program: "python3".to_string(),
                args: vec![
                    "-m".to_string(),
                    "autodebugger".to_string(),
                    "recover".to_string(),
                ],
                timeout_secs: 120,
            },
            demo_mode: false,
        }
    }
}

impl DashboardConfig {
    /// Load configuration
    ///
    /// Reads `path` when given, otherwise `<config dir>/heimdall/config.toml`.
    /// A missing file yields defaults. Environment overrides apply on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_config_file(),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => {
                let content = fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.clone(),
                    source,
                })?;
                let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: p.clone(),
                    source,
                })?;
                info!("Loaded configuration from {}", p.display());
                config
            }
            _ => Self::default(),
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Default config file location
    fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("heimdall").join("config.toml"))
    }

    /// Apply `HEIMDALL_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("HEIMDALL_HOST") {
            self.host = host;
        }

        if let Ok(port) = env::var("HEIMDALL_PORT") {
            self.port = port.parse().map_err(|_| ConfigError::EnvOverride {
                var: "HEIMDALL_PORT".to_string(),
                value: port,
            })?;
        }

        if let Ok(dir) = env::var("HEIMDALL_PUBLIC_DIR") {
            self.public_dir = PathBuf::from(&dir);
            self.stats_file = self.public_dir.join("stats.json");
        }

        if let Ok(file) = env::var("HEIMDALL_STATS_FILE") {
            self.stats_file = PathBuf::from(file);
        }

        if let Ok(demo) = env::var("HEIMDALL_DEMO") {
            self.demo_mode = matches!(demo.as_str(), "1" | "true" | "yes");
        }

        Ok(())
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.diagnose.program.is_empty() || self.autonomous.program.is_empty() {
            return Err(ConfigError::Invalid(
                "analyzer program must not be empty".to_string(),
            ));
        }

        if self.diagnose.timeout_secs == 0 || self.autonomous.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "analyzer timeout must be nonzero".to_string(),
            ));
        }

        Ok(())
    }
}
