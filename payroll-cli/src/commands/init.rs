//! `payroll init [--force]`

use anyhow::{Context, Result};
use clap::Args;

use payroll_core::YamlRosterStore;
use payroll_sync::PipelineConfig;

/// Seed the HR roster with sample employees.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing roster.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, config: &PipelineConfig) -> Result<()> {
        let store = YamlRosterStore::new(&config.roster_path);
        let roster = store
            .seed_sample(self.force)
            .with_context(|| format!("failed to seed roster at {}", config.roster_path.display()))?;

        println!("✓ Seeded {} employees", roster.employees.len());
        println!("  Saved to: {}", config.roster_path.display());
        Ok(())
    }
}
