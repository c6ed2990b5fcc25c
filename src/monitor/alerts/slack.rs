// Slack Alert Channel - Incoming webhook integration

use crate::error::{ConfigError, DeliveryError};
use crate::monitor::alerts::{check_response, http_client, Alert, AlertChannel, AlertSeverity, Heartbeat};
use crate::monitor::config::SlackConfig;
use async_trait::async_trait;
use serde_json::json;

/// Slack alert channel
pub struct SlackChannel {
    config: SlackConfig,
    client: reqwest::Client,
}

impl SlackChannel {
    /// Create new Slack channel
    pub fn new(config: SlackConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            client: http_client("slack")?,
        })
    }

    /// Format alert as Slack message
    fn format_message(&self, alert: &Alert) -> serde_json::Value {
        let color = match alert.severity {
            AlertSeverity::Critical => "#dc3545",
            AlertSeverity::High => "#fd7e14",
            AlertSeverity::Medium => "#ffc107",
            AlertSeverity::Low => "#0dcaf0",
        };

        let fields = vec![
            json!({
                "title": "Hostname",
                "value": alert.hostname,
                "short": true
            }),
            json!({
                "title": "Days Remaining",
                "value": format!("{} days", alert.days_remaining),
                "short": true
            }),
            json!({
                "title": "Threshold",
                "value": format!("{} days", alert.threshold),
                "short": true
            }),
            json!({
                "title": "Expires",
                "value": alert.expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                "short": true
            }),
            json!({
                "title": "Certificate Issuer",
                "value": alert.details.certificate_issuer,
                "short": false
            }),
            json!({
                "title": "Certificate Serial",
                "value": alert.details.certificate_serial,
                "short": true
            }),
        ];

        json!({
            "text": format!("\u{1F6A8} *SSL Certificate Expiration Alert*\n{}", alert.message),
            "attachments": [
                {
                    "color": color,
                    "title": format!("{} Alert", alert.severity.to_string().to_uppercase()),
                    "fields": fields,
                    "footer": "certalert",
                    "ts": alert.timestamp.timestamp()
                }
            ]
        })
    }

    async fn post(&self, payload: &serde_json::Value) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|source| DeliveryError::Request {
                channel: "slack".to_string(),
                source,
            })?;

        check_response("slack", response).await
    }
}

#[async_trait]
impl AlertChannel for SlackChannel {
    async fn send_alert(&self, alert: &Alert) -> Result<(), DeliveryError> {
        self.post(&self.format_message(alert)).await
    }

    async fn send_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), DeliveryError> {
        self.post(&json!({ "text": heartbeat.message() })).await
    }

    fn channel_name(&self) -> &str {
        "slack"
    }

    async fn test_connection(&self) -> Result<(), DeliveryError> {
        self.post(&json!({
            "text": "Test message from certalert - connection successful!"
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::types::CertificateObservation;
    use chrono::{Duration, TimeZone, Utc};

    fn create_test_config() -> SlackConfig {
        SlackConfig {
            enabled: true,
            webhook_url: "https://hooks.slack.com/services/TEST/WEBHOOK/URL".to_string(),
        }
    }

    fn test_alert() -> Alert {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let observation = CertificateObservation {
            domain: "example.com".to_string(),
            valid_from: now - Duration::days(84),
            valid_to: now + Duration::days(6),
            days_to_expiration: 6,
            observed_at: now,
            issuer: "CN=R3, O=Let's Encrypt".to_string(),
            subject: "CN=example.com".to_string(),
            serial_number: "04:a1".to_string(),
            fingerprint: "AB:CD".to_string(),
        };
        Alert::expiry_warning(&observation, 7)
    }

    #[test]
    fn test_slack_channel_new() {
        let channel = SlackChannel::new(create_test_config()).unwrap();
        assert_eq!(channel.channel_name(), "slack");
    }

    #[test]
    fn test_format_message() {
        let channel = SlackChannel::new(create_test_config()).unwrap();
        let message = channel.format_message(&test_alert());

        let text = message["text"].as_str().unwrap();
        assert!(text.contains("SSL Certificate Expiration Alert"));
        assert!(text.contains("*example.com*"));
        assert!(text.contains("Threshold reached: 7 days"));

        assert_eq!(message["attachments"][0]["title"], "HIGH Alert");
        assert_eq!(message["attachments"][0]["color"], "#fd7e14");
        let fields = message["attachments"][0]["fields"].as_array().unwrap();
        assert_eq!(fields[1]["value"], "6 days");
        assert_eq!(fields[2]["value"], "7 days");
    }
}
