// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

use anyhow::Result;
use certalert::commands::CommandRouter;
use certalert::{logging, Args, MonitorConfig};
use clap::Parser;
use colored::Colorize;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Parse command line arguments
    let args = Args::parse();

    if args.output.no_color {
        colored::control::set_override(false);
    }

    // Handle --config-example (write example config and exit)
    if let Some(config_path) = &args.config_example {
        MonitorConfig::create_example(config_path)?;
        println!("✓ Example configuration saved to: {}", config_path.display());
        return Ok(());
    }

    // --configure may be creating the file named by --config
    let config_path = args
        .config
        .as_deref()
        .filter(|path| !(args.monitoring.configure && !path.exists()));
    let config = MonitorConfig::load(config_path)?;

    // Initialize logging - respect RUST_LOG environment variable
    logging::init(logging::level_from_env(), config.logging.file.as_deref())?;

    let command = CommandRouter::route(&args, config)?;
    debug!(command = command.name(), "Executing command");

    command.execute().await
}
