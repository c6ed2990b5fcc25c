// API Response Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving
    pub status: String,

    /// Crate version
    pub version: String,

    /// Seconds since the server started
    pub uptime_seconds: u64,

    /// When the monitor was created
    pub started_at: DateTime<Utc>,

    /// End of the most recent check cycle
    pub last_checked_at: Option<DateTime<Utc>>,

    /// Monitored domains
    pub domains: Vec<String>,

    /// Alert thresholds in days, ascending
    pub thresholds: Vec<u32>,
}

/// Log tail response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    /// Number of lines requested
    pub lines: usize,

    /// Total lines in the log file
    pub total: usize,

    /// The last `lines` lines, oldest first
    pub logs: Vec<String>,

    pub timestamp: DateTime<Utc>,
}
