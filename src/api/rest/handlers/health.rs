//! Health and status handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::rest::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
    })
}

/// Daemon status response
#[derive(Debug, Serialize)]
pub struct DaemonStatusResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub active_mode: String,
    pub is_default_mode: bool,
    pub stats: DaemonStats,
}

/// Daemon statistics
#[derive(Debug, Serialize)]
pub struct DaemonStats {
    pub registered_modes: Vec<String>,
    pub time_groups: usize,
    pub series: usize,
}

/// Daemon status endpoint
pub async fn daemon_status(State(state): State<AppState>) -> Json<DaemonStatusResponse> {
    let (active_mode, is_default_mode) = state.exporter.active_mode();
    let scheduler = state.exporter.scheduler();

    Json(DaemonStatusResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        started_at: state.started_at,
        active_mode,
        is_default_mode,
        stats: DaemonStats {
            registered_modes: scheduler.mode_names(),
            time_groups: scheduler.group_count(),
            series: state.exporter.series_count(),
        },
    })
}
