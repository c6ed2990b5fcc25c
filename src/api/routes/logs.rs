// Log Tail Route

use crate::api::{
    models::{error::ApiError, response::LogsResponse},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_LINES: usize = 100;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub lines: Option<String>,
}

/// Return the last N lines of the log file
pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let lines = parse_lines(query.lines.as_deref())?;

    let path = state
        .log_file
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("File logging is not enabled".to_string()))?;

    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read log file");
        ApiError::Internal(format!("Failed to read log file: {}", e))
    })?;

    let all: Vec<&str> = contents.lines().collect();
    let total = all.len();
    let start = total.saturating_sub(lines);

    Ok(Json(LogsResponse {
        lines,
        total,
        logs: all[start..].iter().map(|l| l.to_string()).collect(),
        timestamp: Utc::now(),
    }))
}

fn parse_lines(raw: Option<&str>) -> Result<usize, ApiError> {
    let raw = match raw {
        None | Some("") => return Ok(DEFAULT_LINES),
        Some(raw) => raw,
    };

    let lines: i64 = raw
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid lines parameter".to_string()))?;

    if lines < 1 {
        return Err(ApiError::BadRequest(
            "Lines parameter must be positive".to_string(),
        ));
    }

    Ok(lines as usize)
}
