// API State Management

use crate::monitor::CertificateMonitor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
pub struct AppState {
    /// Monitor whose status is served
    pub monitor: Arc<CertificateMonitor>,

    /// Bearer token every request must present
    pub auth_token: String,

    /// Log file tailed by `/logs`, if file logging is enabled
    pub log_file: Option<PathBuf>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        monitor: Arc<CertificateMonitor>,
        auth_token: impl Into<String>,
        log_file: Option<PathBuf>,
    ) -> Self {
        Self {
            monitor,
            auth_token: auth_token.into(),
            log_file,
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
