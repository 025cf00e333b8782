//! Overtime hour sources.
//!
//! Overtime hours are an external input to [`crate::compute::compute`]; the
//! ETL run asks an [`OvertimeSource`] for each record.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{EmployeeId, RawEmployeeRecord};

/// Upper bound (inclusive) of randomly simulated overtime hours.
pub const MAX_SIMULATED_OVERTIME_HOURS: u32 = 20;

/// Supplies overtime hours for one employee per ETL run.
pub trait OvertimeSource: Send {
    fn overtime_hours(&mut self, employee: &RawEmployeeRecord) -> u32;
}

/// Uniformly random hours in `[0, max_hours]`.
#[derive(Debug)]
pub struct RandomOvertime {
    rng: StdRng,
    max_hours: u32,
}

impl RandomOvertime {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_hours: MAX_SIMULATED_OVERTIME_HOURS,
        }
    }

    /// Reproducible sequence, used by tests.
    pub fn seeded(seed: u64, max_hours: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_hours,
        }
    }
}

impl Default for RandomOvertime {
    fn default() -> Self {
        Self::new()
    }
}

impl OvertimeSource for RandomOvertime {
    fn overtime_hours(&mut self, _employee: &RawEmployeeRecord) -> u32 {
        self.rng.gen_range(0..=self.max_hours)
    }
}

/// Fixed hours, optionally overridden per employee.
#[derive(Debug, Clone, Default)]
pub struct FixedOvertime {
    default_hours: u32,
    overrides: HashMap<EmployeeId, u32>,
}

impl FixedOvertime {
    pub fn new(default_hours: u32) -> Self {
        Self {
            default_hours,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, employee_id: impl Into<EmployeeId>, hours: u32) -> Self {
        self.overrides.insert(employee_id.into(), hours);
        self
    }
}

impl OvertimeSource for FixedOvertime {
    fn overtime_hours(&mut self, employee: &RawEmployeeRecord) -> u32 {
        self.overrides
            .get(&employee.employee_id)
            .copied()
            .unwrap_or(self.default_hours)
    }
}
