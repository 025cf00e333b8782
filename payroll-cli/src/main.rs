//! Payroll — HR to finance payroll synchronization CLI.
//!
//! # Usage
//!
//! ```text
//! payroll init [--force]
//! payroll export [--overtime EMP001=10]... [--fixed-overtime <hours>] [--json]
//! payroll show [--json]
//! payroll accounting [--out <path>]
//! payroll watch [--accounting]
//! ```
//!
//! Global flags `--roster`, `--channel` and `--debounce-ms` override
//! `~/.payroll/config.yaml`.

mod commands;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{
    accounting::AccountingArgs, export::ExportArgs, init::InitArgs, show::ShowArgs,
    watch::WatchArgs,
};
use payroll_sync::PipelineConfig;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "payroll",
    version,
    about = "Export HR payroll snapshots and keep the finance view live",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed the HR roster with sample employees.
    Init(InitArgs),

    /// Run the ETL: extract employees, compute payroll, publish a snapshot.
    Export(ExportArgs),

    /// Print the latest published snapshot.
    Show(ShowArgs),

    /// Write the accounting export derived from the latest snapshot.
    Accounting(AccountingArgs),

    /// Watch the exchange channel and re-render the report on every publish.
    Watch(WatchArgs),
}

// ---------------------------------------------------------------------------
// Shared configuration flags
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Roster YAML used as the system-of-record.
    #[arg(long, global = true, value_name = "PATH")]
    pub roster: Option<PathBuf>,

    /// Exchange channel file.
    #[arg(long, global = true, value_name = "PATH")]
    pub channel: Option<PathBuf>,

    /// Debounce delay for the watcher, in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub debounce_ms: Option<u64>,
}

impl ConfigArgs {
    /// `~/.payroll/config.yaml` (or defaults) overlaid with these flags.
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load().context("failed to load configuration")?;
        if let Some(roster) = &self.roster {
            config.roster_path = roster.clone();
        }
        if let Some(channel) = &self.channel {
            config.channel_path = channel.clone();
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce = std::time::Duration::from_millis(ms);
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.resolve()?;
    match cli.command {
        Commands::Init(args) => args.run(&config),
        Commands::Export(args) => args.run(&config),
        Commands::Show(args) => args.run(&config),
        Commands::Accounting(args) => args.run(&config),
        Commands::Watch(args) => args.run(&config),
    }
}
