// Certificate Monitoring System
//
// Periodically fetches the leaf certificate of every configured domain and sends
// at most one notification per (domain, threshold) per calendar day, tracked in
// a persistent alert ledger.

pub mod alerts;
pub mod checker;
pub mod config;
pub mod daemon;
pub mod ledger;
pub mod scheduler;
pub mod thresholds;
pub mod types;

// Re-export commonly used types
pub use alerts::{Alert, AlertChannel, AlertSeverity, Heartbeat};
pub use checker::{CertificateMonitor, MonitorStatus};
pub use config::MonitorConfig;
pub use daemon::MonitorDaemon;
pub use ledger::{AlertLedger, HistoryState, HistoryStore, JsonFileStore, MemoryStore};
pub use scheduler::{CycleRunner, Scheduler, SchedulerHandle};
pub use thresholds::ThresholdSet;
pub use types::{CertificateObservation, CheckOutcome, CycleReport, DomainReport};
