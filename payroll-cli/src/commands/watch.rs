//! `payroll watch` — live finance view over the exchange channel.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;

use payroll_sync::{accounting::write_accounting_export, LoadError, PipelineConfig};
use payroll_watch::{start_blocking, ReloadTrigger, WatchEvent};

use crate::report;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Write the accounting export after the initial load.
    #[arg(long)]
    pub accounting: bool,
}

impl WatchArgs {
    pub fn run(self, config: &PipelineConfig) -> Result<()> {
        println!("{}", "=== FINANCE SYSTEM - PAYROLL LOADER ===".bold());
        println!("Monitoring file: {}", config.channel_path.display());
        println!("Type 'r' + Enter to reload manually, 'q' + Enter to quit.\n");

        let accounting_path = if self.accounting {
            Some(
                config
                    .accounting_path
                    .clone()
                    .context("no accounting export path configured")?,
            )
        } else {
            None
        };

        start_blocking(config, |event| {
            render_event(event);
            if let (
                Some(path),
                WatchEvent::Reloaded {
                    trigger: ReloadTrigger::Initial,
                    loaded,
                    ..
                },
            ) = (&accounting_path, event)
            {
                match write_accounting_export(&loaded.snapshot, path, Local::now()) {
                    Ok(_) => println!("✓ Accounting export generated: {}", path.display()),
                    Err(err) => println!("{} accounting export failed: {err}", "✗".red()),
                }
            }
        })
        .context("watcher exited with error")?;

        println!("Finance payroll watcher stopped.");
        Ok(())
    }
}

fn render_event(event: &WatchEvent) {
    match event {
        WatchEvent::Reloaded {
            trigger,
            loaded,
            changed,
        } => {
            match trigger {
                ReloadTrigger::Watcher => {
                    println!("\n{}", "*** Payroll file updated ***".yellow().bold());
                    if !changed {
                        println!("(content identical to the current report)");
                    }
                }
                ReloadTrigger::Manual => println!("\nManual reload triggered..."),
                ReloadTrigger::Initial => {}
            }
            report::print_report(&loaded.snapshot);
        }
        WatchEvent::ReloadFailed {
            trigger: ReloadTrigger::Initial,
            error: LoadError::NotFound { .. },
        } => {
            println!("Payroll data file not found. Waiting for HR system export...");
        }
        WatchEvent::ReloadFailed { error, .. } => {
            report::print_load_failure(error);
            println!("The previously displayed report remains current.");
        }
    }
}
