// HistoryCommand - Print the alert ledger
// certalert - TLS certificate expiration monitor
// Licensed under GPL-3.0

use super::Command;
use crate::monitor::{AlertLedger, HistoryState, MonitorConfig};
use crate::Result;
use async_trait::async_trait;
use colored::Colorize;

/// HistoryCommand prints domain → threshold → last alert date.
///
/// Only needs `data_dir`; the rest of the configuration may be incomplete.
pub struct HistoryCommand {
    config: MonitorConfig,
    json: bool,
}

impl HistoryCommand {
    pub fn new(config: MonitorConfig, json: bool) -> Self {
        Self { config, json }
    }
}

/// Plain-text rendering of the ledger
pub fn render_history(state: &HistoryState) -> String {
    if state.is_empty() {
        return "  No alerts recorded\n".to_string();
    }

    let mut out = String::new();
    for (domain, thresholds) in state.domains() {
        out.push_str(&format!("  {}\n", domain.bold()));
        for (threshold, date) in thresholds {
            out.push_str(&format!("    {:>4} days  last alert {}\n", threshold, date));
        }
    }
    out
}

#[async_trait]
impl Command for HistoryCommand {
    async fn execute(&self) -> Result<()> {
        let ledger = AlertLedger::json_file(&self.config.monitor.data_dir);
        let state = ledger.snapshot().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&state)?);
            return Ok(());
        }

        println!("\nAlert History ({}):", ledger.location());
        println!("{}", "=".repeat(80));
        print!("{}", render_history(&state));
        println!();

        Ok(())
    }

    fn name(&self) -> &'static str {
        "HistoryCommand"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_render_empty_history() {
        assert!(render_history(&HistoryState::new()).contains("No alerts recorded"));
    }

    #[test]
    fn test_render_history() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let state = HistoryState::new()
            .record_alert("a.com", 7, day)
            .record_alert("a.com", 30, day)
            .record_alert("b.com", 14, day);

        let out = render_history(&state);
        assert!(out.contains("a.com"));
        assert!(out.contains("b.com"));
        assert!(out.contains("7 days  last alert 2025-03-01"));
        assert!(out.contains("30 days  last alert 2025-03-01"));
    }
}
