// Generic Webhook Alert Channel

use crate::error::{ConfigError, DeliveryError};
use crate::monitor::alerts::{check_response, http_client, Alert, AlertChannel, Heartbeat};
use crate::monitor::config::WebhookConfig;
use async_trait::async_trait;
use serde_json::json;

/// Generic webhook alert channel
pub struct WebhookChannel {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Create new webhook channel
    pub fn new(config: WebhookConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            client: http_client("webhook")?,
        })
    }

    /// Format alert as JSON for webhook
    fn format_payload(&self, alert: &Alert) -> serde_json::Value {
        json!({
            "source": "certalert",
            "version": "1.0",
            "type": "expiry_warning",
            "alert": {
                "hostname": alert.hostname,
                "severity": alert.severity.to_string(),
                "days_remaining": alert.days_remaining,
                "threshold": alert.threshold,
                "expires_at": alert.expires_at.to_rfc3339(),
                "message": alert.message,
                "timestamp": alert.timestamp.to_rfc3339(),
                "certificate": {
                    "issuer": alert.details.certificate_issuer,
                    "subject": alert.details.certificate_subject,
                    "serial": alert.details.certificate_serial,
                    "fingerprint": alert.details.certificate_fingerprint
                }
            }
        })
    }

    fn format_heartbeat(&self, heartbeat: &Heartbeat) -> serde_json::Value {
        json!({
            "source": "certalert",
            "version": "1.0",
            "type": "heartbeat",
            "message": heartbeat.message(),
            "heartbeat": heartbeat
        })
    }

    async fn post(&self, payload: &serde_json::Value) -> Result<(), DeliveryError> {
        let mut request = self.client.post(&self.config.url).json(payload);

        // Add custom headers
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|source| DeliveryError::Request {
            channel: "webhook".to_string(),
            source,
        })?;

        check_response("webhook", response).await
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    async fn send_alert(&self, alert: &Alert) -> Result<(), DeliveryError> {
        self.post(&self.format_payload(alert)).await
    }

    async fn send_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), DeliveryError> {
        self.post(&self.format_heartbeat(heartbeat)).await
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }

    async fn test_connection(&self) -> Result<(), DeliveryError> {
        self.post(&json!({
            "source": "certalert",
            "version": "1.0",
            "type": "test",
            "message": "Test webhook from certalert"
        }))
        .await
    }
}
