// TestAlertCommand - Send a test message through the configured channel
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use super::Command;
use crate::monitor::alerts::channel_from_config;
use crate::monitor::MonitorConfig;
use crate::Result;
use async_trait::async_trait;
use colored::Colorize;
use tracing::info;

pub struct TestAlertCommand {
    config: MonitorConfig,
}

impl TestAlertCommand {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Command for TestAlertCommand {
    async fn execute(&self) -> Result<()> {
        self.config.validate()?;
        let channel = channel_from_config(&self.config)?;

        info!(channel = channel.channel_name(), "Testing alert channel...");

        println!("\nAlert Channel Test:");
        println!("{}", "=".repeat(80));

        match channel.test_connection().await {
            Ok(()) => {
                println!("  {} {} - Success", "✓".green(), channel.channel_name());
                println!();
                Ok(())
            }
            Err(e) => {
                println!("  {} {} - Failed: {}", "✗".red(), channel.channel_name(), e);
                println!();
                Err(e.into())
            }
        }
    }

    fn name(&self) -> &'static str {
        "TestAlertCommand"
    }
}
