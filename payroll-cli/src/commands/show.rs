//! `payroll show` — print the latest published snapshot.

use anyhow::{bail, Result};
use clap::Args;

use payroll_sync::{read_snapshot, PipelineConfig};
use payroll_watch::latest_snapshot_response;

use crate::report;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Emit the `{status, data}` response envelope instead of a report.
    #[arg(long)]
    pub json: bool,
}

impl ShowArgs {
    pub fn run(self, config: &PipelineConfig) -> Result<()> {
        if self.json {
            let response = latest_snapshot_response(&config.channel_path);
            println!("{}", response.to_json_pretty()?);
            return Ok(());
        }

        match read_snapshot(&config.channel_path) {
            Ok(loaded) => {
                report::print_report(&loaded.snapshot);
                Ok(())
            }
            Err(err) => {
                report::print_load_failure(&err);
                bail!("latest payroll data could not be loaded");
            }
        }
    }
}
