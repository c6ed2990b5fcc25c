// Commands module - Command Pattern implementation
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

mod command;
mod router;

// Individual command implementations
mod check;
mod configure;
mod history;
mod monitor;
mod test_alert;

pub use command::Command;
pub use router::CommandRouter;

// Re-export individual commands for testing purposes
pub use check::CheckCommand;
pub use configure::ConfigureCommand;
pub use history::HistoryCommand;
pub use monitor::MonitorCommand;
pub use test_alert::TestAlertCommand;
