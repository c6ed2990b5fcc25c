// Monitoring Daemon - Main orchestration

use crate::api::{ApiServer, AppState};
use crate::monitor::checker::CertificateMonitor;
use crate::monitor::config::MonitorConfig;
use crate::monitor::scheduler::{Scheduler, SchedulerHandle};
use crate::Result;
use anyhow::Context;
use std::sync::Arc;

/// Long-running monitor: periodic checks, optional heartbeats and the status server
pub struct MonitorDaemon {
    config: MonitorConfig,
    monitor: Arc<CertificateMonitor>,
    scheduler: Scheduler,
}

impl MonitorDaemon {
    /// Create new monitoring daemon from a configuration that must pass validation
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        let monitor = Arc::new(CertificateMonitor::from_config(&config)?);
        Ok(Self::with_monitor(config, monitor))
    }

    /// Use an already wired monitor; intervals and server settings still come from `config`
    pub fn with_monitor(config: MonitorConfig, monitor: Arc<CertificateMonitor>) -> Self {
        let scheduler =
            Scheduler::new(config.check_interval()).with_heartbeat(config.heartbeat_interval());

        Self {
            config,
            monitor,
            scheduler,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.scheduler.handle()
    }

    pub fn monitor(&self) -> &Arc<CertificateMonitor> {
        &self.monitor
    }

    /// Run until SIGINT/SIGTERM or `handle().stop()`
    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            domains = ?self.monitor.domains(),
            thresholds = ?self.monitor.thresholds().as_slice(),
            channel = self.monitor.channel().channel_name(),
            ledger = %self.monitor.ledger().location(),
            "Starting certificate monitor"
        );

        self.setup_signal_handlers();

        let server = self.spawn_server();

        self.scheduler.run(self.monitor.as_ref()).await;

        if let Some(server) = server {
            server
                .await
                .context("Status server task panicked")?
                .context("Status server failed")?;
        }

        tracing::info!("Monitoring daemon stopped");
        Ok(())
    }

    fn spawn_server(&self) -> Option<tokio::task::JoinHandle<Result<()>>> {
        if !self.config.server.enabled {
            return None;
        }

        let token = self.config.server.auth_token.clone().unwrap_or_default();
        let state = AppState::new(
            Arc::clone(&self.monitor),
            token,
            self.config.logging.file.clone(),
        );
        let server = ApiServer::new(self.config.server.clone(), state);

        let handle = self.handle();
        let task = tokio::spawn(async move {
            let shutdown = handle.clone();
            let result = server.run(async move { shutdown.stopped().await }).await;
            if let Err(ref e) = result {
                tracing::error!(error = %e, "Status server exited");
                // Without the server the process would keep running headless
                handle.stop();
            }
            result
        });

        Some(task)
    }

    /// Stop the scheduler on SIGINT or SIGTERM
    fn setup_signal_handlers(&self) {
        let handle = self.handle();

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};

                let (mut sigterm, mut sigint) =
                    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                        (Ok(term), Ok(int)) => (term, int),
                        (Err(e), _) | (_, Err(e)) => {
                            tracing::warn!(error = %e, "Failed to install signal handlers");
                            return;
                        }
                    };

                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM");
                    }
                    _ = sigint.recv() => {
                        tracing::info!("Received SIGINT");
                    }
                    _ = handle.stopped() => return,
                }

                handle.stop();
            }

            #[cfg(not(unix))]
            {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(e) = result {
                            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
                            return;
                        }
                        tracing::info!("Received Ctrl+C");
                    }
                    _ = handle.stopped() => return,
                }

                handle.stop();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::{CertificateFetcher, CertificateInfo};
    use crate::error::{DeliveryError, FetchError};
    use crate::monitor::alerts::{Alert, AlertChannel, Heartbeat};
    use crate::monitor::ledger::{AlertLedger, MemoryStore};
    use crate::monitor::thresholds::ThresholdSet;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct ExpiringSoon;

    #[async_trait]
    impl CertificateFetcher for ExpiringSoon {
        async fn fetch(
            &self,
            host: &str,
            _port: u16,
        ) -> std::result::Result<CertificateInfo, FetchError> {
            let now = Utc::now();
            Ok(CertificateInfo {
                subject: format!("CN={}", host),
                issuer: "CN=Test CA".to_string(),
                serial_number: "01".to_string(),
                not_before: now - ChronoDuration::days(80),
                not_after: now + ChronoDuration::days(3) + ChronoDuration::hours(1),
                fingerprint_sha256: "AA:BB".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct CountingChannel {
        alerts: AtomicUsize,
    }

    #[async_trait]
    impl AlertChannel for CountingChannel {
        async fn send_alert(&self, _alert: &Alert) -> std::result::Result<(), DeliveryError> {
            self.alerts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn send_heartbeat(
            &self,
            _heartbeat: &Heartbeat,
        ) -> std::result::Result<(), DeliveryError> {
            Ok(())
        }

        fn channel_name(&self) -> &str {
            "counting"
        }
    }

    fn test_config() -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.monitor.domains = vec!["a.com".to_string()];
        config.monitor.thresholds = vec![7, 30];
        config.monitor.check_interval_hours = 1;
        config
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = MonitorDaemon::new(MonitorConfig::default());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_checks_then_stops() {
        let channel = Arc::new(CountingChannel::default());
        let store = Arc::new(MemoryStore::new());
        let monitor = Arc::new(CertificateMonitor::new(
            vec!["a.com".to_string()],
            ThresholdSet::new(vec![7, 30]).unwrap(),
            Arc::new(ExpiringSoon),
            channel.clone(),
            Arc::new(AlertLedger::new(Box::new(Arc::clone(&store)))),
        ));

        let daemon = Arc::new(MonitorDaemon::with_monitor(test_config(), monitor));
        let handle = daemon.handle();

        let task = {
            let daemon = Arc::clone(&daemon);
            tokio::spawn(async move { daemon.run().await })
        };

        // The first cycle runs immediately
        tokio::time::timeout(Duration::from_secs(5), async {
            while channel.alerts.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        handle.stop();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(channel.alerts.load(Ordering::SeqCst), 1);
        let state = store.snapshot();
        assert_eq!(
            state.last_alert("a.com", 7),
            Some(Utc::now().date_naive())
        );
    }
}
