// ConfigureCommand - Interactive configuration setup
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use super::Command;
use crate::error::ConfigError;
use crate::monitor::config::SlackConfig;
use crate::monitor::{MonitorConfig, ThresholdSet};
use crate::Result;
use async_trait::async_trait;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Config file written when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "certalert.toml";

/// ConfigureCommand prompts for the monitor settings, validates them and
/// writes the TOML configuration file
pub struct ConfigureCommand {
    base: MonitorConfig,
    path: PathBuf,
}

impl ConfigureCommand {
    /// `base` supplies every setting the prompts do not cover
    pub fn new(base: MonitorConfig, path: Option<&Path>) -> Self {
        Self {
            base,
            path: path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the prompts against `input`, echoing them to `output`.
    ///
    /// Nothing is written unless the answers form a valid configuration.
    pub fn run_setup<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<MonitorConfig> {
        let mut config = self.base.clone();

        let domains = prompt(&mut input, &mut output, "Enter domains to monitor (comma-separated): ")?;
        config.monitor.domains = domains
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect();
        if config.monitor.domains.is_empty() {
            return Err(ConfigError::missing("DOMAINS").into());
        }

        let thresholds = prompt(&mut input, &mut output, "Enter threshold days (comma-separated): ")?;
        config.monitor.thresholds = ThresholdSet::parse(&thresholds)?.as_slice().to_vec();

        let webhook = prompt(&mut input, &mut output, "Enter Slack webhook URL: ")?;
        if webhook.is_empty() {
            return Err(ConfigError::missing("SLACK_WEBHOOK_URL").into());
        }
        config.alerts.slack = Some(SlackConfig {
            enabled: true,
            webhook_url: webhook,
        });
        config.alerts.webhook = None;

        let heartbeat = prompt(
            &mut input,
            &mut output,
            "Enter heartbeat interval in hours (empty to disable): ",
        )?;
        config.monitor.heartbeat_hours = if heartbeat.is_empty() {
            None
        } else {
            Some(parse_field("HEARTBEAT_HOURS", &heartbeat)?)
        };

        let interval = prompt(
            &mut input,
            &mut output,
            &format!(
                "Enter check interval in hours [{}]: ",
                config.monitor.check_interval_hours
            ),
        )?;
        if !interval.is_empty() {
            config.monitor.check_interval_hours = parse_field("CHECK_INTERVAL_HOURS", &interval)?;
        }

        let http = prompt(&mut input, &mut output, "Enable HTTP status server? [y/N]: ")?;
        config.server.enabled = matches!(http.to_lowercase().as_str(), "y" | "yes");

        if config.server.enabled {
            let port = prompt(
                &mut input,
                &mut output,
                &format!("Enter HTTP port [{}]: ", config.server.port),
            )?;
            if !port.is_empty() {
                config.server.port = parse_field("HTTP_PORT", &port)?;
            }

            let token = prompt(&mut input, &mut output, "Enter HTTP auth token: ")?;
            config.server.auth_token = Some(token).filter(|t| !t.is_empty());
        }

        config.validate()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        config.save_to_file(&self.path)?;

        writeln!(output, "Configuration saved to {}", self.path.display())?;
        Ok(config)
    }
}

/// Print `question` and read one trimmed answer; end of input reads as empty
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn parse_field<T: std::str::FromStr>(key: &str, value: &str) -> std::result::Result<T, ConfigError> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::invalid(key, format!("'{}' is not a valid number", value)))
}

#[async_trait]
impl Command for ConfigureCommand {
    async fn execute(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.run_setup(stdin.lock(), stdout.lock())?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ConfigureCommand"
    }
}
