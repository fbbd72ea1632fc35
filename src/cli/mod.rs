//! CLI module
//!
//! Provides:
//! - Argument parsing for the server binary
//! - Deterministic exit codes

pub mod args;

// Re-exports
pub use args::{parse_args, Args};

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),
}

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;
