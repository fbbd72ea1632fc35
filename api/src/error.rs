//! API error envelope
//!
//! Every failure at the endpoint boundary renders as the JSON envelope
//! `{"success": false, "error": ...}` with an appropriate status code. The
//! server process never surfaces a panic or a bare error string to a
//! client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use heimdall_tools::InvokeError;

/// Errors surfaced to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unusable request input
    #[error("{0}")]
    Validation(String),

    /// The analyzer exceeded its deadline and was terminated
    #[error("Analyzer timed out")]
    AnalyzerTimeout,

    /// The analyzer executable could not be launched
    #[error("Analyzer unavailable: {0}")]
    AnalyzerUnavailable(String),

    /// The analyzer ran and reported failure
    #[error("Analyzer exited with code {exit_code:?}")]
    AnalyzerFailed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Anything else; details stay in the server log
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::AnalyzerTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::AnalyzerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::AnalyzerFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvokeError> for ApiError {
    fn from(e: InvokeError) -> Self {
        match e {
            InvokeError::Timeout { .. } => ApiError::AnalyzerTimeout,
            InvokeError::Spawn { program, source } => {
                ApiError::AnalyzerUnavailable(format!("{}: {}", program, source))
            }
            InvokeError::Output { .. } => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::AnalyzerFailed {
                exit_code,
                stdout,
                stderr,
            } => json!({
                "success": false,
                "error": self.to_string(),
                "returncode": exit_code,
                "output": stdout,
                "stderr": stderr,
            }),
            _ => json!({
                "success": false,
                "error": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
