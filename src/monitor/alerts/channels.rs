// Alert Channel Trait

use crate::error::DeliveryError;
use crate::monitor::alerts::{Alert, Heartbeat};
use async_trait::async_trait;

/// Alert channel trait - the single notification capability the monitor calls
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Deliver an expiration alert
    async fn send_alert(&self, alert: &Alert) -> Result<(), DeliveryError>;

    /// Deliver a "still running" message
    async fn send_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), DeliveryError>;

    /// Get the channel name for logging
    fn channel_name(&self) -> &str;

    /// Test the channel connectivity (optional)
    async fn test_connection(&self) -> Result<(), DeliveryError> {
        Ok(())
    }
}
