//! `payroll accounting` — derived export for the accounting system.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use payroll_sync::{accounting::write_accounting_export, read_snapshot, PipelineConfig};

#[derive(Args, Debug)]
pub struct AccountingArgs {
    /// Output path (defaults to the configured accounting export path).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

impl AccountingArgs {
    pub fn run(self, config: &PipelineConfig) -> Result<()> {
        let out = self
            .out
            .or_else(|| config.accounting_path.clone())
            .context("no accounting export path configured; pass --out")?;
        let loaded = read_snapshot(&config.channel_path)
            .context("latest payroll data could not be loaded")?;
        write_accounting_export(&loaded.snapshot, &out, Local::now())
            .with_context(|| format!("failed to write {}", out.display()))?;
        println!("✓ Accounting export generated: {}", out.display());
        Ok(())
    }
}
