// CommandRouter - Routes CLI arguments to appropriate Command
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use super::{
    CheckCommand, Command, ConfigureCommand, HistoryCommand, MonitorCommand, TestAlertCommand,
};
use crate::monitor::MonitorConfig;
use crate::{Args, Result};

/// CommandRouter determines which Command to execute based on CLI arguments
///
/// Routing order:
/// 1. Interactive setup (--configure)
/// 2. History inspection (--show-history)
/// 3. Test alert (--test-alert)
/// 4. Single check cycle (--once)
/// 5. Monitoring daemon (default)
pub struct CommandRouter;

impl CommandRouter {
    /// Route CLI arguments and the loaded configuration to a Command
    pub fn route(args: &Args, config: MonitorConfig) -> Result<Box<dyn Command>> {
        Self::validate_routing(args)?;

        if args.monitoring.configure {
            return Ok(Box::new(ConfigureCommand::new(config, args.config.as_deref())));
        }

        if args.monitoring.show_history {
            return Ok(Box::new(HistoryCommand::new(config, args.output.json)));
        }

        if args.monitoring.test_alert {
            return Ok(Box::new(TestAlertCommand::new(config)));
        }

        if args.monitoring.once {
            return Ok(Box::new(CheckCommand::new(config, args.output.json)));
        }

        Ok(Box::new(MonitorCommand::new(config)))
    }

    /// Reject combinations of operational modes
    pub fn validate_routing(args: &Args) -> Result<()> {
        let mode_count = [
            args.monitoring.once,
            args.monitoring.test_alert,
            args.monitoring.show_history,
            args.monitoring.configure,
        ]
        .iter()
        .filter(|&&x| x)
        .count();

        if mode_count > 1 {
            anyhow::bail!(
                "Cannot combine multiple operational modes (--once, --test-alert, --show-history, --configure)"
            );
        }

        Ok(())
    }
}
