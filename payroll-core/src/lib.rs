//! Payroll core library — domain types, payroll computation, HR store boundary.
//!
//! - [`types`] — employee, payroll record and snapshot types
//! - [`compute`] — pure payroll arithmetic
//! - [`overtime`] — injected overtime hour sources
//! - [`roster`] — [`EmployeeStore`] trait, YAML roster and in-memory stores
//! - [`error`] — [`StoreError`]

pub mod compute;
pub mod error;
pub mod overtime;
pub mod roster;
pub mod types;

pub use compute::compute;
pub use error::StoreError;
pub use overtime::{FixedOvertime, OvertimeSource, RandomOvertime};
pub use roster::{EmployeeStore, MemoryStore, RosterDocument, YamlRosterStore};
pub use types::{EmployeeId, PayrollRecord, PayrollSnapshot, RawEmployeeRecord};
