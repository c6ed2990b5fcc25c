// Health Check Route

use crate::api::{models::response::HealthResponse, state::AppState};
use axum::{extract::State, Json};
use std::sync::Arc;

/// Health check endpoint
///
/// Returns uptime, the monitored domains and when they were last checked
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.monitor.status().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        started_at: status.started_at,
        last_checked_at: status.last_checked_at,
        domains: status.domains,
        thresholds: status.thresholds,
    })
}
