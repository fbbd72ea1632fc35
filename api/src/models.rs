//! API Models
//!
//! Request bodies and server configuration for the dashboard endpoints.
//! Responses are shaped in the handlers; the stats record itself lives in
//! `heimdall-core`.

use serde::{Deserialize, Serialize};

/// Server binding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// Body of `POST /api/debug`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugRequest {
    /// Error log to analyze (`source` accepted as an alias)
    #[serde(default, alias = "source")]
    pub error_log: Option<String>,
    /// Force the canned demo payload
    #[serde(default)]
    pub demo: bool,
}

/// Body of `POST /api/autonomous`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutonomousRequest {
    /// Deployment to recover (`deploymentUrl` accepted as an alias)
    #[serde(default, alias = "deploymentUrl")]
    pub deployment_url: Option<String>,
    /// Force the canned demo payload
    #[serde(default)]
    pub demo: bool,
}
