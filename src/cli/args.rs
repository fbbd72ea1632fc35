//! CLI argument parsing
//!
//! Grammar:
//! ```text
//! heimdall [options]
//!
//! OPTIONS:
//!   --host <addr>        Bind address
//!   --port <n>           Bind port
//!   --config <file>      Configuration file (TOML)
//!   --public-dir <dir>   Static dashboard directory
//!   --stats-file <file>  Stats file path
//!   --demo               Always answer with canned demo payloads
//!   --version            Show version
//!   --help               Show help
//! ```
//!
//! Flags win over environment variables and the config file.

use crate::cli::{Error, Result};

/// Parsed CLI arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    /// Bind address override
    pub host: Option<String>,

    /// Bind port override
    pub port: Option<u16>,

    /// Explicit configuration file
    pub config_file: Option<String>,

    /// Static dashboard directory override
    pub public_dir: Option<String>,

    /// Stats file override
    pub stats_file: Option<String>,

    /// Force demo mode
    pub demo: bool,

    /// Show version and exit
    pub show_version: bool,

    /// Show help and exit
    pub show_help: bool,
}

/// Parse CLI arguments from std::env::args()
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut iter = args.into_iter();
    let _program = iter.next(); // Skip program name

    let mut out = Args::default();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                out.show_version = true;
            }
            "--help" | "-h" => {
                out.show_help = true;
            }
            "--demo" => {
                out.demo = true;
            }
            "--host" => {
                let host = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--host requires an address".to_string())
                })?;
                out.host = Some(host);
            }
            "--port" => {
                let port = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--port requires a number".to_string())
                })?;
                let port = port
                    .parse()
                    .map_err(|_| Error::InvalidArgs(format!("Invalid port: {}", port)))?;
                out.port = Some(port);
            }
            "--config" => {
                let path = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--config requires a path".to_string())
                })?;
                out.config_file = Some(path);
            }
            "--public-dir" => {
                let path = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--public-dir requires a path".to_string())
                })?;
                out.public_dir = Some(path);
            }
            "--stats-file" => {
                let path = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--stats-file requires a path".to_string())
                })?;
                out.stats_file = Some(path);
            }
            other => {
                return Err(Error::InvalidArgs(format!("Unknown option: {}", other)));
            }
        }
    }

    Ok(out)
}
