// Command trait - Defines the interface for all command implementations
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use crate::Result;
use async_trait::async_trait;

/// One operational mode of certalert (daemon, single cycle, test alert, history).
///
/// Each command validates the configuration it needs itself, so read-only
/// modes such as `--show-history` work with a partial configuration.
#[async_trait]
pub trait Command: Send + Sync {
    /// Execute the command; an `Err` makes the process exit non-zero
    async fn execute(&self) -> Result<()>;

    /// Get a human-readable name for this command (for logging/debugging)
    fn name(&self) -> &'static str;
}
