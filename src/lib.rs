// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

//! certalert watches the TLS certificates of a set of domains and sends a
//! notification when a certificate crosses one of the configured day thresholds.
//! Alerts are deduplicated per domain, threshold and calendar day through a
//! ledger persisted on disk, so restarts never repeat a notification.

pub mod api;
pub mod certificates;
pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod utils;

// Re-export commonly used types
pub use crate::cli::Args;
pub use crate::monitor::{CertificateMonitor, MonitorConfig, MonitorDaemon};

/// Result type for certalert operations
pub type Result<T> = anyhow::Result<T>;

/// Error type for certalert operations
pub use anyhow::Error;
