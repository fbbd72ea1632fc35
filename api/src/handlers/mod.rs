//! API Handlers Module
//!
//! Request handlers for the dashboard endpoints. Each handler translates a
//! JSON body into StatsStore/ExternalAnalyzer calls and shapes the JSON
//! response; demo fallbacks keep every endpoint answering when no real
//! analyzer is installed.

pub mod demo;

use std::sync::Arc;

use axum::debug_handler;
use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use heimdall_core::{DashboardConfig, StatsDelta, StatsRecord, StatsStore};
use heimdall_tools::{AnalyzerRun, ErrorPayload, ExternalAnalyzer};

use crate::error::ApiError;
use crate::models::{AutonomousRequest, DebugRequest};

/// Shared state behind every handler
pub struct ApiState {
    /// Full server configuration
    pub config: DashboardConfig,
    /// The persisted statistics record
    pub stats: StatsStore,
    /// The out-of-process analyzer seam
    pub analyzer: Arc<dyn ExternalAnalyzer>,
}

/// Merge a delta, logging persist failures instead of failing the request
///
/// Stats persistence is best-effort: the merged in-memory record is always
/// returned so the client sees the updated counters.
fn merge_stats(state: &ApiState, delta: &StatsDelta) -> StatsRecord {
    match state.stats.merge(delta) {
        Ok(record) => record,
        Err(e) => {
            error!("Failed to persist stats: {}", e);
            state.stats.snapshot()
        }
    }
}

/// Map a finished analyzer run to the response, after stats were updated
fn shape_run_response(run: AnalyzerRun, stats: StatsRecord, key: &str) -> Result<Json<Value>, ApiError> {
    if !run.success() {
        return Err(ApiError::AnalyzerFailed {
            exit_code: run.exit_code,
            stdout: run.stdout,
            stderr: run.stderr,
        });
    }

    let mut body = json!({
        "success": true,
        "returncode": 0,
        "stats": stats,
    });
    if let Some(steps) = run.report.get("steps") {
        body["steps"] = steps.clone();
    }
    body[key] = run.report;
    Ok(Json(body))
}

/// Get current statistics (for the dashboard)
#[debug_handler]
pub async fn get_stats(State(state): State<Arc<ApiState>>) -> Json<StatsRecord> {
    Json(state.stats.snapshot())
}

/// Merge a stats delta (called by the CLI after a task)
#[debug_handler]
pub async fn update_stats(
    State(state): State<Arc<ApiState>>,
    Json(delta): Json<StatsDelta>,
) -> Json<Value> {
    debug!("Merging stats delta: {:?}", delta);
    let stats = merge_stats(&state, &delta);
    Json(json!({ "success": true, "stats": stats }))
}

/// Reset all statistics
#[debug_handler]
pub async fn reset_stats(State(state): State<Arc<ApiState>>) -> Json<Value> {
    info!("Resetting dashboard statistics");
    let stats = match state.stats.reset() {
        Ok(record) => record,
        Err(e) => {
            error!("Failed to persist stats reset: {}", e);
            state.stats.snapshot()
        }
    };
    Json(json!({ "success": true, "stats": stats }))
}

/// Run the diagnosis flow on a submitted error log
#[debug_handler]
pub async fn run_debug(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<DebugRequest>,
) -> Result<Json<Value>, ApiError> {
    let error_log = match request.error_log.as_deref() {
        Some(log) if !log.is_empty() => log,
        _ => return Err(ApiError::Validation("No error log provided".to_string())),
    };

    let request_id = Uuid::new_v4();
    let availability = state.analyzer.availability();

    if request.demo || state.config.demo_mode || !availability.diagnose.available {
        debug!("Debug request {} answered in demo mode", request_id);
        let stats = merge_stats(&state, &StatsDelta::task(true));
        return Ok(Json(demo::demo_diagnosis(error_log, &stats)));
    }

    info!("Debug request {}: invoking analyzer", request_id);
    let payload = ErrorPayload::write(error_log).map_err(|e| {
        error!("Failed to stage analyzer payload: {}", e);
        ApiError::Internal
    })?;

    // The payload guard lives until this handler returns, so the temp file
    // is removed on success, failure, and timeout alike.
    let run = match state.analyzer.diagnose(payload.path()).await {
        Ok(run) => run,
        Err(e) => {
            warn!("Debug request {} failed: {}", request_id, e);
            return Err(e.into());
        }
    };

    let resolved = run.success();
    let stats = merge_stats(&state, &StatsDelta::task(resolved));
    if !resolved {
        warn!(
            "Debug request {}: analyzer exited with {:?}",
            request_id, run.exit_code
        );
    } else {
        info!(
            "Debug request {}: analysis completed in {}ms",
            request_id, run.duration_ms
        );
    }

    shape_run_response(run, stats, "diagnosis")
}

/// Run the autonomous recovery flow against a deployment
#[debug_handler]
pub async fn run_autonomous(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AutonomousRequest>,
) -> Result<Json<Value>, ApiError> {
    let url = match request.deployment_url.as_deref() {
        Some(url) if !url.is_empty() => url,
        _ => {
            return Err(ApiError::Validation(
                "No deployment URL provided".to_string(),
            ))
        }
    };

    let request_id = Uuid::new_v4();
    let availability = state.analyzer.availability();

    if request.demo || state.config.demo_mode || !availability.autonomous.available {
        debug!("Autonomous request {} answered in demo mode", request_id);
        let stats = merge_stats(&state, &StatsDelta::task(true));
        return Ok(Json(demo::demo_recovery(url, &stats)));
    }

    info!(
        "Autonomous request {}: recovering {} with the external agent",
        request_id, url
    );
    let run = match state.analyzer.recover(url).await {
        Ok(run) => run,
        Err(e) => {
            warn!("Autonomous request {} failed: {}", request_id, e);
            return Err(e.into());
        }
    };

    let resolved = run.success();
    let stats = merge_stats(&state, &StatsDelta::task(resolved));
    if resolved {
        info!(
            "Autonomous request {}: recovery completed in {}ms",
            request_id, run.duration_ms
        );
    }

    shape_run_response(run, stats, "result")
}

/// Capability probe plus the current stats snapshot
#[debug_handler]
pub async fn get_status(State(state): State<Arc<ApiState>>) -> Json<Value> {
    let availability = state.analyzer.availability();

    Json(json!({
        "status": "ok",
        "service": "heimdall-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "analyzer": {
            "diagnose": {
                "command": availability.diagnose.command,
                "available": availability.diagnose.available,
            },
            "autonomous": {
                "command": availability.autonomous.command,
                "available": availability.autonomous.available,
            },
        },
        "demo_mode": state.config.demo_mode,
        "stats": state.stats.snapshot(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use heimdall_tools::{AnalyzerAvailability, CommandStatus, InvokeError};
    use std::path::Path;
    use tempfile::TempDir;

    struct StubAnalyzer {
        available: bool,
        run: Option<AnalyzerRun>,
    }

    impl StubAnalyzer {
        fn unavailable() -> Self {
            Self {
                available: false,
                run: None,
            }
        }

        fn with_run(run: AnalyzerRun) -> Self {
            Self {
                available: true,
                run: Some(run),
            }
        }
    }

    #[async_trait]
    impl ExternalAnalyzer for StubAnalyzer {
        fn availability(&self) -> AnalyzerAvailability {
            AnalyzerAvailability {
                diagnose: CommandStatus {
                    command: "stub analyze".to_string(),
                    available: self.available,
                },
                autonomous: CommandStatus {
                    command: "stub recover".to_string(),
                    available: self.available,
                },
            }
        }

        async fn diagnose(&self, _payload: &Path) -> Result<AnalyzerRun, InvokeError> {
            Ok(self.run.clone().expect("stub run not set"))
        }

        async fn recover(&self, _deployment_url: &str) -> Result<AnalyzerRun, InvokeError> {
            Ok(self.run.clone().expect("stub run not set"))
        }
    }

    fn state_with(dir: &TempDir, analyzer: StubAnalyzer) -> Arc<ApiState> {
        let config = DashboardConfig::default();
        Arc::new(ApiState {
            config,
            stats: StatsStore::open(dir.path().join("stats.json")),
            analyzer: Arc::new(analyzer),
        })
    }

    fn successful_run(stdout: &str) -> AnalyzerRun {
        AnalyzerRun {
            exit_code: Some(0),
            report: serde_json::from_str(stdout)
                .ok()
                .filter(Value::is_object)
                .unwrap_or_else(|| json!({ "output": stdout })),
            stdout: stdout.to_string(),
            stderr: String::new(),
            duration_ms: 12,
        }
    }

    #[tokio::test]
    async fn test_stats_update_then_get_then_reset() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, StubAnalyzer::unavailable());

        let delta: StatsDelta =
            serde_json::from_str(r#"{"tasks_executed": 2, "issues_resolved": 1}"#).unwrap();
        let response = update_stats(State(state.clone()), Json(delta)).await;
        assert_eq!(response.0["success"], true);
        assert_eq!(response.0["stats"]["tasks_executed"], 2);
        assert_eq!(response.0["stats"]["success_rate"], 50.0);

        let snapshot = get_stats(State(state.clone())).await;
        assert_eq!(snapshot.0.tasks_executed, 2);

        let reset = reset_stats(State(state.clone())).await;
        assert_eq!(reset.0["stats"]["tasks_executed"], 0);
        assert_eq!(state.stats.snapshot(), StatsRecord::default());
    }

    #[tokio::test]
    async fn test_debug_requires_error_log() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, StubAnalyzer::unavailable());

        let result = run_debug(State(state), Json(DebugRequest::default())).await;
        match result {
            Err(ApiError::Validation(message)) => assert_eq!(message, "No error log provided"),
            other => panic!("Expected validation error, got {:?}", other.map(|j| j.0)),
        }
    }

    #[tokio::test]
    async fn test_debug_demo_flag_returns_canned_payload() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, StubAnalyzer::unavailable());

        let request = DebugRequest {
            error_log: Some("TypeError: x is undefined".to_string()),
            demo: true,
        };
        let response = run_debug(State(state.clone()), Json(request)).await.unwrap();

        assert_eq!(response.0["demo"], true);
        assert_eq!(response.0["success"], true);
        assert!(response.0["diagnosis"]["severity"].is_string());
        // Demo still advances the dashboard
        assert_eq!(state.stats.snapshot().tasks_executed, 1);
        assert_eq!(state.stats.snapshot().issues_resolved, 1);
    }

    #[tokio::test]
    async fn test_debug_falls_back_to_demo_when_tool_missing() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, StubAnalyzer::unavailable());

        let request = DebugRequest {
            error_log: Some("boom".to_string()),
            demo: false,
        };
        let response = run_debug(State(state), Json(request)).await.unwrap();
        assert_eq!(response.0["demo"], true);
    }

    #[tokio::test]
    async fn test_debug_real_run_success() {
        let dir = TempDir::new().unwrap();
        let state = state_with(
            &dir,
            StubAnalyzer::with_run(successful_run(r#"{"severity": "medium"}"#)),
        );

        let request = DebugRequest {
            error_log: Some("boom".to_string()),
            demo: false,
        };
        let response = run_debug(State(state.clone()), Json(request)).await.unwrap();

        assert_eq!(response.0["success"], true);
        assert_eq!(response.0["diagnosis"]["severity"], "medium");
        assert_eq!(response.0["returncode"], 0);
        let stats = state.stats.snapshot();
        assert_eq!(stats.tasks_executed, 1);
        assert_eq!(stats.issues_resolved, 1);
    }

    #[tokio::test]
    async fn test_debug_nonzero_exit_maps_to_failure_envelope() {
        let dir = TempDir::new().unwrap();
        let failing = AnalyzerRun {
            exit_code: Some(2),
            report: json!({ "output": "" }),
            stdout: "partial".to_string(),
            stderr: "trace missing".to_string(),
            duration_ms: 5,
        };
        let state = state_with(&dir, StubAnalyzer::with_run(failing));

        let request = DebugRequest {
            error_log: Some("boom".to_string()),
            demo: false,
        };
        let result = run_debug(State(state.clone()), Json(request)).await;

        match result {
            Err(ApiError::AnalyzerFailed {
                exit_code, stderr, ..
            }) => {
                assert_eq!(exit_code, Some(2));
                assert!(stderr.contains("trace missing"));
            }
            other => panic!("Expected failure envelope, got {:?}", other.map(|j| j.0)),
        }

        // The task still counted, just not as resolved
        let stats = state.stats.snapshot();
        assert_eq!(stats.tasks_executed, 1);
        assert_eq!(stats.issues_resolved, 0);
    }

    #[tokio::test]
    async fn test_autonomous_requires_url() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, StubAnalyzer::unavailable());

        let result = run_autonomous(State(state), Json(AutonomousRequest::default())).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_autonomous_demo_has_five_steps() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, StubAnalyzer::unavailable());

        let request = AutonomousRequest {
            deployment_url: Some("https://example.test/app".to_string()),
            demo: true,
        };
        let response = run_autonomous(State(state), Json(request)).await.unwrap();

        assert_eq!(response.0["demo"], true);
        assert_eq!(response.0["steps"].as_array().unwrap().len(), 5);
        assert!(response.0["result"]["summary"]
            .as_str()
            .unwrap()
            .contains("https://example.test/app"));
    }

    #[tokio::test]
    async fn test_autonomous_surfaces_tool_steps() {
        let dir = TempDir::new().unwrap();
        let state = state_with(
            &dir,
            StubAnalyzer::with_run(successful_run(
                r#"{"steps": [{"name": "patch"}], "summary": "fixed"}"#,
            )),
        );

        let request = AutonomousRequest {
            deployment_url: Some("https://example.test/app".to_string()),
            demo: false,
        };
        let response = run_autonomous(State(state), Json(request)).await.unwrap();

        assert_eq!(response.0["steps"][0]["name"], "patch");
        assert_eq!(response.0["result"]["summary"], "fixed");
    }

    #[tokio::test]
    async fn test_status_reports_capabilities_and_stats() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, StubAnalyzer::unavailable());
        state.stats.merge(&StatsDelta::task(true)).unwrap();

        let response = get_status(State(state)).await;

        assert_eq!(response.0["status"], "ok");
        assert_eq!(response.0["service"], "heimdall-api");
        assert_eq!(response.0["analyzer"]["diagnose"]["available"], false);
        assert_eq!(response.0["analyzer"]["diagnose"]["command"], "stub analyze");
        assert_eq!(response.0["stats"]["tasks_executed"], 1);
    }
}
