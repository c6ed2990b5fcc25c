// Certificate Monitor - Per-domain expiration checks and deduplicated alerting

use crate::certificates::{CertificateFetcher, TlsCertificateFetcher};
use crate::error::{CheckError, DeliveryError, FetchError};
use crate::monitor::alerts::{self, Alert, AlertChannel, Heartbeat};
use crate::monitor::config::MonitorConfig;
use crate::monitor::ledger::AlertLedger;
use crate::monitor::scheduler::CycleRunner;
use crate::monitor::thresholds::ThresholdSet;
use crate::monitor::types::{CertificateObservation, CheckOutcome, CycleReport, DomainReport};
use crate::utils::network::split_host_port;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;

const DEFAULT_MAX_CONCURRENT: usize = 4;
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Point-in-time view of the monitor, served by the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub started_at: DateTime<Utc>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub domains: Vec<String>,
    pub thresholds: Vec<u32>,
    pub channel: String,
}

/// Checks configured domains and sends at most one alert per (domain, threshold, day)
pub struct CertificateMonitor {
    domains: Vec<String>,
    thresholds: ThresholdSet,
    fetcher: Arc<dyn CertificateFetcher>,
    channel: Arc<dyn AlertChannel>,
    ledger: Arc<AlertLedger>,
    max_concurrent: usize,
    fetch_timeout: Duration,
    started_at: DateTime<Utc>,
    last_checked_at: RwLock<Option<DateTime<Utc>>>,
}

impl CertificateMonitor {
    pub fn new(
        domains: Vec<String>,
        thresholds: ThresholdSet,
        fetcher: Arc<dyn CertificateFetcher>,
        channel: Arc<dyn AlertChannel>,
        ledger: Arc<AlertLedger>,
    ) -> Self {
        Self {
            domains,
            thresholds,
            fetcher,
            channel,
            ledger,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            started_at: Utc::now(),
            last_checked_at: RwLock::new(None),
        }
    }

    /// Wire the production collaborators from a validated configuration
    pub fn from_config(config: &MonitorConfig) -> crate::Result<Self> {
        let fetcher = TlsCertificateFetcher::new(config.connect_timeout(), config.handshake_timeout())?;
        let channel: Arc<dyn AlertChannel> = Arc::from(alerts::channel_from_config(config)?);
        let ledger = Arc::new(AlertLedger::json_file(&config.monitor.data_dir));

        Ok(Self::new(
            config.domains(),
            config.threshold_set()?,
            Arc::new(fetcher),
            channel,
            ledger,
        )
        .with_max_concurrent(config.monitor.max_concurrent_checks)
        .with_fetch_timeout(config.fetch_timeout()))
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    pub fn ledger(&self) -> &Arc<AlertLedger> {
        &self.ledger
    }

    pub fn channel(&self) -> &Arc<dyn AlertChannel> {
        &self.channel
    }

    pub async fn status(&self) -> MonitorStatus {
        MonitorStatus {
            started_at: self.started_at,
            last_checked_at: *self.last_checked_at.read().await,
            domains: self.domains.clone(),
            thresholds: self.thresholds.as_slice().to_vec(),
            channel: self.channel.channel_name().to_string(),
        }
    }

    /// Check one domain now
    pub async fn check_certificate(&self, domain: &str) -> Result<CheckOutcome, CheckError> {
        self.check_certificate_at(domain, Utc::now()).await
    }

    /// Check one domain as if the current time were `now`
    pub async fn check_certificate_at(
        &self,
        domain: &str,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome, CheckError> {
        let cert = self.fetch(domain).await?;
        let observation = CertificateObservation::new(domain, cert, now);
        let days = observation.days_to_expiration;
        let today = observation.observed_on();

        tracing::debug!(
            domain = %domain,
            days_remaining = days,
            expires_at = %observation.valid_to.to_rfc3339(),
            "Certificate observed"
        );

        if observation.is_expired() {
            tracing::warn!(domain = %domain, days_remaining = days, "Certificate has expired");
        }

        // Load, decide, notify and record without another task touching the ledger
        let ledger = self.ledger.lock().await;
        let state = ledger.load()?;

        let threshold = match self.thresholds.select(days) {
            Some(threshold) => threshold,
            None => return Ok(CheckOutcome::WithinLimits { days_to_expiration: days }),
        };

        if !state.should_alert(domain, threshold, today) {
            tracing::debug!(
                domain = %domain,
                threshold,
                days_remaining = days,
                "Alert already sent today"
            );
            return Ok(CheckOutcome::AlreadyAlerted {
                days_to_expiration: days,
                threshold,
                last_alert: state.last_alert(domain, threshold).unwrap_or(today),
            });
        }

        let alert = Alert::expiry_warning(&observation, threshold);
        self.channel.send_alert(&alert).await?;

        let state = state.record_alert(domain, threshold, today);
        ledger.save(&state)?;

        tracing::info!(
            domain = %domain,
            threshold,
            days_remaining = days,
            expires_at = %observation.valid_to.to_rfc3339(),
            channel = self.channel.channel_name(),
            "Expiration alert sent"
        );

        Ok(CheckOutcome::Alerted {
            days_to_expiration: days,
            threshold,
        })
    }

    async fn fetch(&self, domain: &str) -> Result<crate::certificates::CertificateInfo, FetchError> {
        let (host, port) = split_host_port(domain);

        match timeout(self.fetch_timeout, self.fetcher.fetch(&host, port)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                host,
                port,
                stage: "fetching certificate from",
                duration: self.fetch_timeout,
            }),
        }
    }

    /// Check every configured domain with bounded concurrency
    pub async fn check_all(&self) -> CycleReport {
        let started_at = Utc::now();
        tracing::info!(domains = self.domains.len(), "Starting certificate check cycle");

        let this = self;
        let domains: Vec<DomainReport> = stream::iter(self.domains.iter().cloned())
            .map(move |domain| async move {
                let result = this.check_certificate(&domain).await;
                log_result(&domain, &result);
                DomainReport { domain, result }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let finished_at = Utc::now();
        *self.last_checked_at.write().await = Some(finished_at);

        let report = CycleReport {
            started_at,
            finished_at,
            domains,
        };

        tracing::info!(
            checked = report.domains.len(),
            alerts = report.alerts_sent(),
            failures = report.failures(),
            "Certificate check cycle complete"
        );

        report
    }

    /// Send the "still running" message through the alert channel
    pub async fn send_heartbeat(&self) -> Result<(), DeliveryError> {
        let heartbeat = Heartbeat {
            domains: self.domains.clone(),
            thresholds: self.thresholds.as_slice().to_vec(),
            last_checked_at: *self.last_checked_at.read().await,
            timestamp: Utc::now(),
        };

        self.channel.send_heartbeat(&heartbeat).await?;
        tracing::info!(domains = self.domains.len(), "Heartbeat sent");
        Ok(())
    }
}

fn log_result(domain: &str, result: &Result<CheckOutcome, CheckError>) {
    match result {
        Ok(outcome) => {
            tracing::debug!(domain = %domain, outcome = %outcome, "Domain checked");
        }
        Err(CheckError::Storage(e)) => {
            tracing::error!(
                domain = %domain,
                error_kind = "storage",
                error = %e,
                "Alert history unavailable; no alert decision made"
            );
        }
        Err(e) => {
            tracing::error!(
                domain = %domain,
                error_kind = e.kind(),
                error = %e,
                "Certificate check failed"
            );
        }
    }
}

#[async_trait]
impl CycleRunner for CertificateMonitor {
    async fn run_cycle(&self) {
        self.check_all().await;
    }

    async fn heartbeat(&self) {
        if let Err(e) = self.send_heartbeat().await {
            tracing::warn!(error_kind = "delivery", error = %e, "Failed to send heartbeat");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::CertificateInfo;
    use crate::monitor::ledger::{HistoryState, MemoryStore};
    use chrono::{NaiveDate, TimeZone};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedFetcher {
        expiries: HashMap<String, DateTime<Utc>>,
    }

    #[async_trait]
    impl CertificateFetcher for FixedFetcher {
        async fn fetch(&self, host: &str, port: u16) -> Result<CertificateInfo, FetchError> {
            match self.expiries.get(host) {
                Some(not_after) => Ok(CertificateInfo {
                    subject: format!("CN={}", host),
                    issuer: "CN=Test CA".to_string(),
                    serial_number: "01".to_string(),
                    not_before: *not_after - chrono::Duration::days(90),
                    not_after: *not_after,
                    fingerprint_sha256: "AA".to_string(),
                }),
                None => Err(FetchError::DnsResolutionFailed {
                    hostname: format!("{}:{}", host, port),
                    details: "no such host".to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingChannel {
        alerts: Mutex<Vec<(String, u32)>>,
        fail: bool,
    }

    #[async_trait]
    impl AlertChannel for RecordingChannel {
        async fn send_alert(&self, alert: &Alert) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Status {
                    channel: "test".to_string(),
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            self.alerts
                .lock()
                .unwrap()
                .push((alert.hostname.clone(), alert.threshold));
            Ok(())
        }

        async fn send_heartbeat(&self, _heartbeat: &Heartbeat) -> Result<(), DeliveryError> {
            Ok(())
        }

        fn channel_name(&self) -> &str {
            "test"
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
    }

    fn monitor_with(
        expiries: &[(&str, i64)],
        channel: Arc<RecordingChannel>,
        store: MemoryStore,
    ) -> (CertificateMonitor, Arc<MemoryStore>) {
        let store = Arc::new(store);
        let fetcher = FixedFetcher {
            expiries: expiries
                .iter()
                .map(|(d, days)| (d.to_string(), now() + chrono::Duration::days(*days)))
                .collect(),
        };
        let ledger = Arc::new(AlertLedger::new(Box::new(Arc::clone(&store))));
        let monitor = CertificateMonitor::new(
            expiries.iter().map(|(d, _)| d.to_string()).collect(),
            ThresholdSet::new(vec![7, 14, 30]).unwrap(),
            Arc::new(fetcher),
            channel,
            ledger,
        );
        (monitor, store)
    }

    fn today() -> NaiveDate {
        now().date_naive()
    }

    #[tokio::test]
    async fn test_alert_then_dedup() {
        let channel = Arc::new(RecordingChannel::default());
        let (monitor, store) = monitor_with(&[("a.com", 6)], Arc::clone(&channel), MemoryStore::new());

        let first = monitor.check_certificate_at("a.com", now()).await.unwrap();
        assert_eq!(
            first,
            CheckOutcome::Alerted {
                days_to_expiration: 6,
                threshold: 7
            }
        );
        assert_eq!(store.snapshot().last_alert("a.com", 7), Some(today()));

        let second = monitor.check_certificate_at("a.com", now()).await.unwrap();
        assert!(matches!(second, CheckOutcome::AlreadyAlerted { threshold: 7, .. }));
        assert_eq!(channel.alerts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_within_limits() {
        let channel = Arc::new(RecordingChannel::default());
        let (monitor, store) = monitor_with(&[("far.com", 90)], Arc::clone(&channel), MemoryStore::new());

        let outcome = monitor.check_certificate_at("far.com", now()).await.unwrap();
        assert_eq!(outcome, CheckOutcome::WithinLimits { days_to_expiration: 90 });
        assert!(store.snapshot().is_empty());
        assert!(channel.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_leaves_ledger_untouched() {
        let channel = Arc::new(RecordingChannel {
            fail: true,
            ..Default::default()
        });
        let (monitor, store) = monitor_with(&[("a.com", 6)], channel, MemoryStore::new());

        let err = monitor.check_certificate_at("a.com", now()).await.unwrap_err();
        assert_eq!(err.kind(), "delivery");
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_isolated() {
        let channel = Arc::new(RecordingChannel::default());
        let (monitor, store) = monitor_with(&[("a.com", 6)], Arc::clone(&channel), MemoryStore::new());

        let err = monitor.check_certificate_at("missing.com", now()).await.unwrap_err();
        assert_eq!(err.kind(), "network");
        assert!(store.snapshot().domain("missing.com").is_none());

        assert!(monitor.check_certificate_at("a.com", now()).await.is_ok());
        assert_eq!(channel.alerts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_new_day_alerts_again() {
        let channel = Arc::new(RecordingChannel::default());
        let yesterday = today().pred_opt().unwrap();
        let history = HistoryState::new().record_alert("a.com", 7, yesterday);
        let (monitor, _store) =
            monitor_with(&[("a.com", 6)], Arc::clone(&channel), MemoryStore::with_state(history));

        let outcome = monitor.check_certificate_at("a.com", now()).await.unwrap();
        assert!(matches!(outcome, CheckOutcome::Alerted { .. }));
    }

    #[tokio::test]
    async fn test_check_all_reports_every_domain() {
        let channel = Arc::new(RecordingChannel::default());
        let (monitor, _store) = monitor_with(
            &[("a.com", 6), ("b.com", 20), ("c.com", 200)],
            Arc::clone(&channel),
            MemoryStore::new(),
        );

        let report = monitor.check_all().await;
        assert_eq!(report.domains.len(), 3);
        assert_eq!(report.domains[0].domain, "a.com");
        assert!(report.is_success());
        assert!(monitor.status().await.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        struct SlowFetcher;

        #[async_trait]
        impl CertificateFetcher for SlowFetcher {
            async fn fetch(&self, _host: &str, _port: u16) -> Result<CertificateInfo, FetchError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(FetchError::NoCertificate {
                    host: "slow".to_string(),
                })
            }
        }

        let monitor = CertificateMonitor::new(
            vec!["slow.com".to_string()],
            ThresholdSet::new(vec![7]).unwrap(),
            Arc::new(SlowFetcher),
            Arc::new(RecordingChannel::default()),
            Arc::new(AlertLedger::new(Box::new(MemoryStore::new()))),
        )
        .with_fetch_timeout(Duration::from_millis(50));

        let err = monitor.check_certificate("slow.com").await.unwrap_err();
        assert_eq!(err.kind(), "timeout");
    }
}
