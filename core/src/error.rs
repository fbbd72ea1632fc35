//! Core error types
//!
//! Persistence of the stats record is best-effort: callers log a
//! `StatsError` and keep serving. Configuration errors are hard errors —
//! the operator asked for something the server cannot do.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while persisting the statistics record
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Failed to write stats file {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode stats record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value in {var}: {value}")]
    EnvOverride { var: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
