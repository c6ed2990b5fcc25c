// Alert System - expiration alerts and the channel that delivers them

pub mod channels;
pub mod slack;
pub mod webhook;

use crate::error::{ConfigError, DeliveryError};
use crate::monitor::config::MonitorConfig;
use crate::monitor::types::CertificateObservation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use channels::AlertChannel;

/// Alert severity, derived from days remaining
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn from_days_remaining(days_remaining: i64) -> Self {
        if days_remaining <= 1 {
            AlertSeverity::Critical
        } else if days_remaining <= 7 {
            AlertSeverity::High
        } else if days_remaining <= 14 {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "Low"),
            AlertSeverity::Medium => write!(f, "Medium"),
            AlertSeverity::High => write!(f, "High"),
            AlertSeverity::Critical => write!(f, "Critical"),
        }
    }
}

/// Certificate details carried along with an alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDetails {
    pub certificate_serial: String,
    pub certificate_issuer: String,
    pub certificate_subject: String,
    pub certificate_fingerprint: String,
}

/// Expiration alert message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub hostname: String,
    pub days_remaining: i64,
    pub expires_at: DateTime<Utc>,
    pub threshold: u32,
    pub severity: AlertSeverity,
    pub message: String,
    pub details: AlertDetails,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Create an expiry warning for an observation that reached `threshold`
    pub fn expiry_warning(observation: &CertificateObservation, threshold: u32) -> Self {
        let days_remaining = observation.days_to_expiration;
        let message = format!(
            "The SSL certificate for *{}* will expire in *{}* days ({}).\nThreshold reached: {} days\nPlease take action to renew the certificate before it expires.",
            observation.domain,
            days_remaining,
            observation.valid_to.to_rfc3339(),
            threshold
        );

        Self {
            hostname: observation.domain.clone(),
            days_remaining,
            expires_at: observation.valid_to,
            threshold,
            severity: AlertSeverity::from_days_remaining(days_remaining),
            message,
            details: AlertDetails {
                certificate_serial: observation.serial_number.clone(),
                certificate_issuer: observation.issuer.clone(),
                certificate_subject: observation.subject.clone(),
                certificate_fingerprint: observation.fingerprint.clone(),
            },
            timestamp: observation.observed_at,
        }
    }
}

/// Periodic "monitor is alive" message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heartbeat {
    pub domains: Vec<String>,
    pub thresholds: Vec<u32>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl Heartbeat {
    pub fn message(&self) -> String {
        let thresholds = self
            .thresholds
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let last_check = self
            .last_checked_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());

        format!(
            "SSL Certificate Checker is running\nMonitoring domains: {}\nThresholds: {} days\nLast check: {}",
            self.domains.join(", "),
            thresholds,
            last_check
        )
    }
}

/// Build the configured notification channel
pub fn channel_from_config(config: &MonitorConfig) -> Result<Box<dyn AlertChannel>, ConfigError> {
    if let Some(ref slack_config) = config.alerts.slack {
        if slack_config.enabled {
            return Ok(Box::new(slack::SlackChannel::new(slack_config.clone())?));
        }
    }

    if let Some(ref webhook_config) = config.alerts.webhook {
        if webhook_config.enabled {
            return Ok(Box::new(webhook::WebhookChannel::new(webhook_config.clone())?));
        }
    }

    Err(ConfigError::missing("SLACK_WEBHOOK_URL"))
}

/// Turn a non-success HTTP response into a delivery error
pub(crate) async fn check_response(
    channel: &str,
    response: reqwest::Response,
) -> Result<(), DeliveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(DeliveryError::Status {
        channel: channel.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// HTTP client shared by the webhook-style channels
pub(crate) fn http_client(channel: &str) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(concat!("certalert/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::invalid(channel, format!("failed to build HTTP client: {}", e)))
}
