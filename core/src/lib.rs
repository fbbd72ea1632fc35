//! Heimdall core — dashboard state and configuration
//!
//! Owns the persisted statistics record the dashboard displays and the
//! server configuration, including the external analyzer command templates.

pub mod config;
pub mod error;
pub mod stats;

pub use config::{AnalyzerCommand, DashboardConfig};
pub use error::{ConfigError, StatsError};
pub use stats::{StatsDelta, StatsRecord, StatsStore};
