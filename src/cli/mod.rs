// CLI module - Command line interface and argument parsing
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use clap::Parser;
use std::path::PathBuf;

// Sub-modules for organized CLI arguments
mod monitoring_args;
mod output_args;

// Re-export sub-structs
pub use monitoring_args::MonitoringArgs;
pub use output_args::OutputArgs;

/// certalert - TLS certificate expiration monitor
///
/// Settings come from an optional TOML file; environment variables
/// (DOMAINS, THRESHOLD_DAYS, SLACK_WEBHOOK_URL, ...) override it.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "certalert", author, version)]
#[command(about = "TLS certificate expiration monitor with deduplicated threshold alerts")]
pub struct Args {
    /// Configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write an example configuration file and exit
    #[arg(long = "config-example", value_name = "FILE")]
    pub config_example: Option<PathBuf>,

    // ============ Monitoring Modes ============
    #[command(flatten)]
    pub monitoring: MonitoringArgs,

    // ============ Output and Display ============
    #[command(flatten)]
    pub output: OutputArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let args = Args::parse_from(["certalert"]);
        assert!(args.config.is_none());
        assert!(!args.monitoring.once);
        assert!(!args.monitoring.test_alert);
        assert!(!args.monitoring.show_history);
        assert!(!args.monitoring.configure);
    }

    #[test]
    fn test_parse_modes() {
        let args = Args::parse_from(["certalert", "-c", "certalert.toml", "--once", "--json"]);
        assert_eq!(args.config, Some(PathBuf::from("certalert.toml")));
        assert!(args.monitoring.once);
        assert!(args.output.json);

        let args = Args::parse_from(["certalert", "--show-history", "--no-color"]);
        assert!(args.monitoring.show_history);
        assert!(args.output.no_color);
    }

    #[test]
    fn test_modes_conflict() {
        let result = Args::try_parse_from(["certalert", "--once", "--test-alert"]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["certalert", "--configure", "--show-history"]);
        assert!(result.is_err());

        let args = Args::parse_from(["certalert", "--configure", "-c", "new.toml"]);
        assert!(args.monitoring.configure);
    }
}
