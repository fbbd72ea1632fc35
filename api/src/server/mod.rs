//! API Server Module
//!
//! Server setup: route table, shared state, middleware, and the static
//! dashboard. CORS is permissive for every route so the dashboard can be
//! developed against a separately served frontend.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{
    get_stats, get_status, reset_stats, run_autonomous, run_debug, update_stats, ApiState,
};
use crate::models::ApiConfig;

/// Main API server
pub struct ApiServer {
    /// Server binding configuration
    config: ApiConfig,
    /// Shared state
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiConfig, state: Arc<ApiState>) -> Self {
        Self { config, state }
    }

    /// Build the router serving the API and the static dashboard
    pub fn router(&self) -> Router {
        let public_dir = self.state.config.public_dir.clone();
        let index = public_dir.join("index.html");

        Router::new()
            // Statistics
            .route("/api/stats", get(get_stats))
            .route("/api/stats/update", post(update_stats))
            .route("/api/reset", post(reset_stats))
            // Analyzer flows
            .route("/api/debug", post(run_debug))
            .route("/api/autonomous", post(run_autonomous))
            // Capability probe
            .route("/api/status", get(get_status))
            // Static dashboard; stats.json lives in the same directory
            .route_service("/", ServeFile::new(index))
            .fallback_service(ServeDir::new(public_dir))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
            .with_state(self.state.clone())
    }

    /// Start the API server
    pub async fn start(&self) -> Result<()> {
        info!(
            "Starting Heimdall API server on {}:{}",
            self.config.host, self.config.port
        );

        let app = self.router();

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        info!("Dashboard available at http://{}/", addr);
        info!("API available at http://{}/api/stats", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start API server: {}", e))?;

        Ok(())
    }
}
