// MonitorCommand - Certificate monitoring daemon
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use super::Command;
use crate::monitor::{MonitorConfig, MonitorDaemon};
use crate::Result;
use async_trait::async_trait;
use tracing::info;

/// MonitorCommand runs the scheduler (and the status server when enabled)
/// until SIGINT or SIGTERM
pub struct MonitorCommand {
    config: MonitorConfig,
}

impl MonitorCommand {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Command for MonitorCommand {
    async fn execute(&self) -> Result<()> {
        let daemon = MonitorDaemon::new(self.config.clone())?;

        info!(
            interval_hours = self.config.monitor.check_interval_hours,
            heartbeat_hours = self.config.monitor.heartbeat_hours,
            http_enabled = self.config.server.enabled,
            "Starting certificate monitoring daemon"
        );

        daemon.run().await
    }

    fn name(&self) -> &'static str {
        "MonitorCommand"
    }
}
