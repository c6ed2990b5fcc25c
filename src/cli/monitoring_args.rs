// Monitoring mode arguments
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use clap::Args;

/// Operational mode; without any flag the monitoring daemon runs
#[derive(Args, Debug, Clone, Default)]
pub struct MonitoringArgs {
    /// Run a single check cycle, print a summary and exit
    #[arg(long = "once", conflicts_with_all = ["test_alert", "show_history", "configure"])]
    pub once: bool,

    /// Send a test message through the configured alert channel
    #[arg(long = "test-alert", conflicts_with_all = ["show_history", "configure"])]
    pub test_alert: bool,

    /// Print the alert history (domain, threshold, last alert date)
    #[arg(long = "show-history", conflicts_with = "configure")]
    pub show_history: bool,

    /// Interactively write a configuration file (to --config, or certalert.toml)
    #[arg(long = "configure")]
    pub configure: bool,
}
