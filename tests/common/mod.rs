// Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use certalert::certificates::{CertificateFetcher, CertificateInfo};
use certalert::error::{DeliveryError, FetchError};
use certalert::monitor::{Alert, AlertChannel, Heartbeat};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Certificate whose validity ends `days` days (plus a few hours) after `now`
pub fn certificate_expiring_in(days: i64, now: DateTime<Utc>) -> CertificateInfo {
    CertificateInfo {
        subject: "CN=test".to_string(),
        issuer: "CN=Test CA".to_string(),
        serial_number: "0A:0B".to_string(),
        not_before: now - Duration::days(90),
        not_after: now + Duration::days(days) + Duration::hours(6),
        fingerprint_sha256: "AA:BB:CC".to_string(),
    }
}

/// Serves canned certificates per host; unknown hosts fail with a connection error
#[derive(Default)]
pub struct StaticFetcher {
    certificates: Mutex<HashMap<String, CertificateInfo>>,
}

impl StaticFetcher {
    pub fn with(mut self, host: &str, cert: CertificateInfo) -> Self {
        self.certificates
            .get_mut()
            .unwrap()
            .insert(host.to_string(), cert);
        self
    }
}

#[async_trait]
impl CertificateFetcher for StaticFetcher {
    async fn fetch(&self, host: &str, port: u16) -> Result<CertificateInfo, FetchError> {
        self.certificates
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .ok_or_else(|| FetchError::ConnectionFailed {
                host: host.to_string(),
                port,
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            })
    }
}

/// Records delivered alerts; can be switched into a failing mode
#[derive(Default)]
pub struct RecordingChannel {
    pub alerts: Mutex<Vec<Alert>>,
    pub heartbeats: Mutex<Vec<Heartbeat>>,
    pub fail: AtomicBool,
}

impl RecordingChannel {
    pub fn failing() -> Self {
        let channel = Self::default();
        channel.fail.store(true, Ordering::SeqCst);
        channel
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Status {
                channel: "recording".to_string(),
                status: 500,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    async fn send_alert(&self, alert: &Alert) -> Result<(), DeliveryError> {
        self.check()?;
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }

    async fn send_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), DeliveryError> {
        self.check()?;
        self.heartbeats.lock().unwrap().push(heartbeat.clone());
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}
