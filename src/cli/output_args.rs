// Output format arguments
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use clap::Args;

/// Output format and display options for one-shot commands
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Print results as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Disable colored output
    #[arg(long = "no-color", alias = "no-colour")]
    pub no_color: bool,
}
