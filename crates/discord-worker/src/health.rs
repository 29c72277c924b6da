//! Health check endpoint

use std::sync::Arc;
use std::time::SystemTime;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::pool::PoolStats;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime_secs: u64,
    pub in_flight: usize,
    pub processed: u64,
    pub failed: u64,
    pub unknown_commands: u64,
}

/// Shared application state for health checks
#[derive(Clone)]
pub struct AppState {
    pub start_time: SystemTime,
    pub stats: Arc<PoolStats>,
}

impl AppState {
    pub fn new(stats: Arc<PoolStats>) -> Self {
        Self {
            start_time: SystemTime::now(),
            stats,
        }
    }

    pub fn snapshot(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            uptime_secs: self.start_time.elapsed().unwrap_or_default().as_secs(),
            in_flight: self.stats.in_flight(),
            processed: self.stats.processed(),
            failed: self.stats.failed(),
            unknown_commands: self.stats.unknown_commands(),
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    (StatusCode::OK, Json(state.snapshot()))
}

async fn live_handler() -> StatusCode {
    StatusCode::OK
}

/// Create the health check router
pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/live", get(live_handler))
        .with_state(state)
}

/// Start the health check server
pub async fn start_health_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_health_router(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Health check server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
