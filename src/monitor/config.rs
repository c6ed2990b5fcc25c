// Monitoring configuration

use crate::error::ConfigError;
use crate::monitor::thresholds::ThresholdSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main monitoring configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub domains: Vec<String>,
    pub thresholds: Vec<u32>,
    pub check_interval_hours: u64,
    pub heartbeat_hours: Option<u64>,
    pub max_concurrent_checks: usize,
    pub connect_timeout_seconds: u64,
    pub handshake_timeout_seconds: u64,
    pub fetch_timeout_seconds: u64,
    pub data_dir: PathBuf,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            thresholds: Vec::new(),
            check_interval_hours: 6,
            heartbeat_hours: None,
            max_concurrent_checks: 4,
            connect_timeout_seconds: 10,
            handshake_timeout_seconds: 10,
            fetch_timeout_seconds: 30,
            data_dir: PathBuf::from(".certalert/data"),
        }
    }
}

/// Alerts configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertsConfig {
    pub slack: Option<SlackConfig>,
    pub webhook: Option<WebhookConfig>,
}

/// Slack configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub webhook_url: String,
}

/// Webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// HTTP status server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "0.0.0.0".to_string(),
            port: 8080,
            auth_token: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl MonitorConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the optional TOML file and overlay process environment variables.
    ///
    /// Not validated: commands that only read the history can run with a partial config.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides; `lookup` abstracts the environment for testing
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(domains) = get("DOMAINS") {
            self.monitor.domains = parse_domains(&domains);
        }

        if let Some(thresholds) = get("THRESHOLD_DAYS") {
            self.monitor.thresholds = ThresholdSet::parse(&thresholds)?.as_slice().to_vec();
        }

        if let Some(url) = get("SLACK_WEBHOOK_URL") {
            self.alerts.slack = Some(SlackConfig {
                enabled: true,
                webhook_url: url,
            });
        }

        if let Some(url) = get("WEBHOOK_URL") {
            let headers = self
                .alerts
                .webhook
                .take()
                .map(|w| w.headers)
                .unwrap_or_default();
            self.alerts.webhook = Some(WebhookConfig {
                enabled: true,
                url,
                headers,
            });
        }

        if let Some(hours) = get("CHECK_INTERVAL_HOURS") {
            self.monitor.check_interval_hours = parse_number("CHECK_INTERVAL_HOURS", &hours)?;
        }

        if let Some(hours) = get("HEARTBEAT_HOURS") {
            self.monitor.heartbeat_hours = Some(parse_number("HEARTBEAT_HOURS", &hours)?);
        }

        if let Some(max) = get("MAX_CONCURRENT_CHECKS") {
            self.monitor.max_concurrent_checks = parse_number("MAX_CONCURRENT_CHECKS", &max)?;
        }

        if let Some(dir) = get("DATA_DIR") {
            self.monitor.data_dir = PathBuf::from(dir);
        }

        if let Some(enabled) = get("HTTP_ENABLED") {
            self.server.enabled = matches!(enabled.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        if let Some(port) = get("HTTP_PORT") {
            self.server.port = port
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid("HTTP_PORT", "must be between 1 and 65535"))?;
        }

        if let Some(token) = get("HTTP_AUTH_TOKEN") {
            self.server.auth_token = Some(token);
        }

        if let Some(file) = get("LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }

        Ok(())
    }

    /// Fail fast on anything the monitor cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domains().is_empty() {
            return Err(ConfigError::missing("DOMAINS"));
        }

        self.threshold_set()?;

        match self.enabled_channels().len() {
            0 => return Err(ConfigError::missing("SLACK_WEBHOOK_URL")),
            1 => {}
            _ => {
                return Err(ConfigError::invalid(
                    "alerts",
                    "only one notification channel may be enabled",
                ))
            }
        }

        if let Some(ref slack) = self.alerts.slack {
            if slack.enabled && slack.webhook_url.trim().is_empty() {
                return Err(ConfigError::missing("SLACK_WEBHOOK_URL"));
            }
        }

        if let Some(ref webhook) = self.alerts.webhook {
            if webhook.enabled && webhook.url.trim().is_empty() {
                return Err(ConfigError::missing("WEBHOOK_URL"));
            }
        }

        validate_hours("CHECK_INTERVAL_HOURS", self.monitor.check_interval_hours)?;

        if let Some(hours) = self.monitor.heartbeat_hours {
            validate_hours("HEARTBEAT_HOURS", hours)?;
        }

        for (key, seconds) in [
            ("CONNECT_TIMEOUT_SECONDS", self.monitor.connect_timeout_seconds),
            ("HANDSHAKE_TIMEOUT_SECONDS", self.monitor.handshake_timeout_seconds),
            ("FETCH_TIMEOUT_SECONDS", self.monitor.fetch_timeout_seconds),
        ] {
            if seconds == 0 {
                return Err(ConfigError::invalid(key, "must be a positive number of seconds"));
            }
        }

        if self.monitor.max_concurrent_checks == 0 {
            return Err(ConfigError::invalid(
                "MAX_CONCURRENT_CHECKS",
                "must be at least 1",
            ));
        }

        if self.server.enabled {
            let has_token = self
                .server
                .auth_token
                .as_deref()
                .map(|t| !t.trim().is_empty())
                .unwrap_or(false);
            if !has_token {
                return Err(ConfigError::missing("HTTP_AUTH_TOKEN"));
            }

            if self.server.port == 0 {
                return Err(ConfigError::invalid("HTTP_PORT", "must be between 1 and 65535"));
            }
        }

        Ok(())
    }

    /// Configured domains, trimmed, without blanks
    pub fn domains(&self) -> Vec<String> {
        self.monitor
            .domains
            .iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect()
    }

    pub fn threshold_set(&self) -> Result<ThresholdSet, ConfigError> {
        ThresholdSet::new(self.monitor.thresholds.clone())
    }

    pub fn check_interval(&self) -> Duration {
        hours_to_duration(self.monitor.check_interval_hours)
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.monitor
            .heartbeat_hours
            .map(hours_to_duration)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.monitor.connect_timeout_seconds)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.monitor.handshake_timeout_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.monitor.fetch_timeout_seconds)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let toml_str = toml::to_string_pretty(self)?;

        fs::write(path, toml_str).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Example configuration for `--config-example`
    pub fn example() -> Self {
        let mut config = Self::default();
        config.monitor.domains = vec!["example.com".to_string(), "example.org:8443".to_string()];
        config.monitor.thresholds = vec![7, 14, 30];
        config.monitor.heartbeat_hours = Some(24);
        config.alerts.slack = Some(SlackConfig {
            enabled: true,
            webhook_url: "https://hooks.slack.com/services/XXX/YYY/ZZZ".to_string(),
        });
        config.server.auth_token = Some("change-me".to_string());
        config.logging.file = Some(PathBuf::from(".certalert/certalert.log"));
        config
    }

    /// Write the example configuration
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        Self::example().save_to_file(path)
    }

    /// Get list of enabled alert channels
    pub fn enabled_channels(&self) -> Vec<String> {
        let mut channels = Vec::new();

        if let Some(ref slack) = self.alerts.slack {
            if slack.enabled {
                channels.push("slack".to_string());
            }
        }

        if let Some(ref webhook) = self.alerts.webhook {
            if webhook.enabled {
                channels.push("webhook".to_string());
            }
        }

        channels
    }
}

/// Longest accepted check or heartbeat interval (one year)
pub const MAX_INTERVAL_HOURS: u64 = 24 * 366;

fn validate_hours(key: &str, hours: u64) -> Result<(), ConfigError> {
    if hours == 0 || hours > MAX_INTERVAL_HOURS {
        return Err(ConfigError::invalid(
            key,
            format!("must be between 1 and {} hours", MAX_INTERVAL_HOURS),
        ));
    }
    Ok(())
}

// Saturates so an unvalidated config cannot overflow
fn hours_to_duration(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

fn parse_domains(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::invalid(key, format!("'{}' is not a valid number", value)))
}
