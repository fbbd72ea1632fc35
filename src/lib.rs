//! Heimdall: dashboard server for an autonomous debugging agent
//!
//! Serves the static dashboard, the statistics API, and the analyzer
//! endpoints. The actual diagnosis and recovery intelligence lives in an
//! external CLI this server invokes; when none is installed the server
//! answers with canned demo payloads so the dashboard still works.

pub mod cli;

pub use cli::{parse_args, Args};
