//! `payroll export` — run one ETL pass and publish the snapshot.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use payroll_core::{FixedOvertime, OvertimeSource, RandomOvertime, YamlRosterStore};
use payroll_sync::{EtlOrchestrator, EtlResult, PipelineConfig};

/// Arguments for `payroll export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Overtime hours for one employee, e.g. `EMP001=10`. Repeatable.
    #[arg(long, value_name = "ID=HOURS")]
    pub overtime: Vec<OvertimeArg>,

    /// Use these hours for every employee without an `--overtime` entry
    /// instead of simulating random hours.
    #[arg(long, value_name = "HOURS")]
    pub fixed_overtime: Option<u32>,

    /// Emit the ETL result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// `EMP001=10`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvertimeArg {
    pub employee_id: String,
    pub hours: u32,
}

impl FromStr for OvertimeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (id, hours) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ID=HOURS, got '{s}'"))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("missing employee id in '{s}'"));
        }
        let hours = hours
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid hours in '{s}'; expected a non-negative integer"))?;
        Ok(Self {
            employee_id: id.to_string(),
            hours,
        })
    }
}

impl fmt::Display for OvertimeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.employee_id, self.hours)
    }
}

impl ExportArgs {
    pub fn run(self, config: &PipelineConfig) -> Result<()> {
        let store = Arc::new(YamlRosterStore::new(&config.roster_path));
        let mut etl = EtlOrchestrator::new(config, store, self.overtime_source());
        let result = etl.run();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(&result);
        }

        if !result.is_success() {
            bail!("ETL run failed");
        }
        Ok(())
    }

    fn overtime_source(&self) -> Box<dyn OvertimeSource> {
        if self.overtime.is_empty() && self.fixed_overtime.is_none() {
            return Box::new(RandomOvertime::new());
        }
        let fixed = self
            .overtime
            .iter()
            .fold(FixedOvertime::new(self.fixed_overtime.unwrap_or(0)), |source, arg| {
                source.with_override(arg.employee_id.as_str(), arg.hours)
            });
        Box::new(fixed)
    }
}

fn print_result(result: &EtlResult) {
    if result.is_success() {
        println!("{} {}", "✓".green(), result.message);
        println!("  Records processed: {}", result.records_processed);
        println!("  Total net payroll: {:.2}", result.total_net_payroll);
        if let Some(path) = &result.channel_path {
            println!("  Published to:      {}", path.display());
        }
    } else {
        println!("{} {}", "✗".red(), result.message);
        if let Some(error) = &result.error {
            println!("  Error kind: {}", error.kind.as_str().red());
        }
        println!("  The previously published snapshot was left in place.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overtime_arg_parses_id_and_hours() {
        let arg: OvertimeArg = "EMP001=10".parse().unwrap();
        assert_eq!(arg.employee_id, "EMP001");
        assert_eq!(arg.hours, 10);
        assert_eq!(arg.to_string(), "EMP001=10");
    }

    #[test]
    fn overtime_arg_rejects_bad_input() {
        assert!("EMP001".parse::<OvertimeArg>().is_err());
        assert!("=4".parse::<OvertimeArg>().is_err());
        assert!("EMP001=-2".parse::<OvertimeArg>().is_err());
    }
}
