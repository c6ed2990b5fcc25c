// CheckCommand - Run a single check cycle and print a summary
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use super::Command;
use crate::monitor::{CertificateMonitor, CheckOutcome, CycleReport, MonitorConfig};
use crate::Result;
use async_trait::async_trait;
use colored::Colorize;
use serde_json::json;

/// CheckCommand runs one pass over all domains (alerts and ledger updates included)
/// and fails if any domain could not be checked
pub struct CheckCommand {
    config: MonitorConfig,
    json: bool,
}

impl CheckCommand {
    pub fn new(config: MonitorConfig, json: bool) -> Self {
        Self { config, json }
    }
}

/// JSON view of a cycle report
pub fn report_json(report: &CycleReport) -> serde_json::Value {
    let domains: Vec<serde_json::Value> = report
        .domains
        .iter()
        .map(|d| match &d.result {
            Ok(outcome) => json!({
                "domain": d.domain,
                "status": "ok",
                "result": outcome,
            }),
            Err(e) => json!({
                "domain": d.domain,
                "status": "error",
                "error_kind": e.kind(),
                "error": e.to_string(),
            }),
        })
        .collect();

    json!({
        "started_at": report.started_at.to_rfc3339(),
        "finished_at": report.finished_at.to_rfc3339(),
        "alerts_sent": report.alerts_sent(),
        "failures": report.failures(),
        "domains": domains,
    })
}

fn print_summary(report: &CycleReport) {
    println!("\nCertificate Check Results:");
    println!("{}", "=".repeat(80));

    for d in &report.domains {
        match &d.result {
            Ok(outcome @ CheckOutcome::WithinLimits { .. }) => {
                println!("  {} {} - {}", "✓".green(), d.domain, outcome);
            }
            Ok(outcome) => {
                println!("  {} {} - {}", "!".yellow(), d.domain, outcome.to_string().yellow());
            }
            Err(e) => {
                println!("  {} {} - {} error: {}", "✗".red(), d.domain, e.kind(), e);
            }
        }
    }

    println!("{}", "=".repeat(80));
    println!(
        "  {} domains, {} alerts sent, {} failed",
        report.domains.len(),
        report.alerts_sent(),
        report.failures()
    );
    println!();
}

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self) -> Result<()> {
        self.config.validate()?;
        let monitor = CertificateMonitor::from_config(&self.config)?;

        let report = monitor.check_all().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
        } else {
            print_summary(&report);
        }

        if !report.is_success() {
            anyhow::bail!(
                "{} of {} domains could not be checked",
                report.failures(),
                report.domains.len()
            );
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "CheckCommand"
    }
}
