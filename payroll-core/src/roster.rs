//! System-of-record boundary: the employee roster.
//!
//! # Storage layout
//!
//! ```text
//! ~/.payroll/
//!   hr/
//!     employees.yaml   (roster document — mode 0600)
//! ```
//!
//! The pipeline only ever reads through [`EmployeeStore::extract`]; seeding
//! is an administrative step (`payroll init`).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{io_err, StoreError};
use crate::types::{
    default_health_insurance, default_overtime_rate, default_retirement_contribution,
    default_tax_rate, EmployeeId, RawEmployeeRecord,
};

pub const ROSTER_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// 1. Store trait
// ---------------------------------------------------------------------------

/// Read side of the HR store.
///
/// Implementations return every employee ordered by `employee_id`, or fail
/// with [`StoreError::Unavailable`] / [`StoreError::Schema`].
pub trait EmployeeStore: Send + Sync {
    fn extract(&self) -> Result<Vec<RawEmployeeRecord>, StoreError>;

    /// Human-readable location used in logs.
    fn location(&self) -> String;
}

/// On-disk roster payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDocument {
    pub version: u32,
    #[serde(default)]
    pub employees: Vec<RawEmployeeRecord>,
}

// ---------------------------------------------------------------------------
// 2. YAML roster store
// ---------------------------------------------------------------------------

/// `<home>/.payroll/hr/employees.yaml` — pure, no I/O.
pub fn roster_path_at(home: &Path) -> PathBuf {
    home.join(".payroll").join("hr").join("employees.yaml")
}

/// Employee store backed by a YAML roster file.
#[derive(Debug, Clone)]
pub struct YamlRosterStore {
    path: PathBuf,
}

impl YamlRosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the roster without validating rows.
    pub fn load(&self) -> Result<RosterDocument, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::unavailable(
                    self.location(),
                    "roster file not found; run `payroll init` first",
                ));
            }
            Err(err) => return Err(StoreError::unavailable(self.location(), err)),
        };
        serde_yaml::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Write `document` atomically.
    ///
    /// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
    pub fn save(&self, document: &RosterDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let yaml = serde_yaml::to_string(document)?;
        let tmp_path = self.path.with_extension("yaml.tmp");
        std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
        set_file_permissions(&tmp_path)?;
        if let Err(err) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(io_err(&self.path, err));
        }
        Ok(())
    }

    /// Seed the roster with the sample employees.
    ///
    /// Fails with [`StoreError::AlreadyExists`] unless `force` is set.
    pub fn seed_sample(&self, force: bool) -> Result<RosterDocument, StoreError> {
        if self.path.exists() && !force {
            return Err(StoreError::AlreadyExists {
                path: self.path.clone(),
            });
        }
        let document = RosterDocument {
            version: ROSTER_VERSION,
            employees: sample_employees(),
        };
        self.save(&document)?;
        Ok(document)
    }
}

impl EmployeeStore for YamlRosterStore {
    fn extract(&self) -> Result<Vec<RawEmployeeRecord>, StoreError> {
        let document = self.load()?;
        validate_and_order(&self.location(), document.employees)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// 3. In-memory store
// ---------------------------------------------------------------------------

/// Employee store holding records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<RawEmployeeRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<RawEmployeeRecord>) -> Self {
        Self { records }
    }
}

impl EmployeeStore for MemoryStore {
    fn extract(&self) -> Result<Vec<RawEmployeeRecord>, StoreError> {
        validate_and_order(&self.location(), self.records.clone())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

// ---------------------------------------------------------------------------
// 4. Validation
// ---------------------------------------------------------------------------

/// Check every row against the schema and sort by `employee_id`.
pub fn validate_and_order(
    location: &str,
    mut records: Vec<RawEmployeeRecord>,
) -> Result<Vec<RawEmployeeRecord>, StoreError> {
    let mut seen = HashSet::new();
    for record in &records {
        validate_record(location, record)?;
        if !seen.insert(record.employee_id.clone()) {
            return Err(StoreError::schema(
                location,
                format!("duplicate employee_id '{}'", record.employee_id),
            ));
        }
    }
    records.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
    Ok(records)
}

/// Largest amount whose cent value is exactly representable as an f64 on the
/// JSON wire (2^53 - 1 cents).
pub const MAX_CURRENCY_AMOUNT: Decimal = Decimal::from_parts(0xFFFF_FFFF, 0x1F_FFFF, 0, false, 2);

/// Upper bound for `overtime_rate`.
pub const MAX_OVERTIME_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

fn validate_record(location: &str, record: &RawEmployeeRecord) -> Result<(), StoreError> {
    let id = &record.employee_id;
    let fail = |reason: String| Err(StoreError::schema(location, reason));

    if id.0.trim().is_empty() {
        return fail("employee_id must not be empty".to_string());
    }
    if record.basic_pay < Decimal::ZERO {
        return fail(format!("{id}: basic_pay must be >= 0"));
    }
    if record.overtime_rate < Decimal::ONE || record.overtime_rate > MAX_OVERTIME_RATE {
        return fail(format!("{id}: overtime_rate must be within [1.0, {MAX_OVERTIME_RATE}]"));
    }
    if record.tax_rate < Decimal::ZERO || record.tax_rate > Decimal::ONE {
        return fail(format!("{id}: tax_rate must be within [0, 1]"));
    }
    if record.health_insurance < Decimal::ZERO {
        return fail(format!("{id}: health_insurance must be >= 0"));
    }
    if record.retirement_contribution < Decimal::ZERO {
        return fail(format!("{id}: retirement_contribution must be >= 0"));
    }
    for (field, amount) in [
        ("basic_pay", record.basic_pay),
        ("health_insurance", record.health_insurance),
        ("retirement_contribution", record.retirement_contribution),
    ] {
        if amount > MAX_CURRENCY_AMOUNT {
            return fail(format!("{id}: {field} must be <= {MAX_CURRENCY_AMOUNT}"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 5. Sample data
// ---------------------------------------------------------------------------

/// The four sample employees written by `payroll init`.
pub fn sample_employees() -> Vec<RawEmployeeRecord> {
    [
        ("EMP001", "john", "doe", "Engineering", 500000),
        ("EMP002", "jane", "smith", "Marketing", 600000),
        ("EMP003", "bob", "johnson", "Sales", 450000),
        ("EMP004", "alice", "williams", "HR", 550000),
    ]
    .into_iter()
    .map(|(id, first, last, department, cents)| RawEmployeeRecord {
        employee_id: EmployeeId::from(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        department: department.to_string(),
        basic_pay: Decimal::new(cents, 2),
        overtime_rate: default_overtime_rate(),
        tax_rate: default_tax_rate(),
        health_insurance: default_health_insurance(),
        retirement_contribution: default_retirement_contribution(),
    })
    .collect()
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn roster_path_is_correct() {
        let home = Path::new("/home/test");
        assert_eq!(
            roster_path_at(home),
            PathBuf::from("/home/test/.payroll/hr/employees.yaml")
        );
    }

    #[test]
    fn seed_then_extract_returns_sorted_sample() {
        let home = TempDir::new().unwrap();
        let store = YamlRosterStore::new(roster_path_at(home.path()));
        store.seed_sample(false).expect("seed");

        let records = store.extract().expect("extract");
        let ids: Vec<&str> = records.iter().map(|r| r.employee_id.0.as_str()).collect();
        assert_eq!(ids, ["EMP001", "EMP002", "EMP003", "EMP004"]);
        assert_eq!(records[1].basic_pay, Decimal::new(6000, 0));
    }

    #[test]
    fn seed_refuses_to_overwrite_without_force() {
        let home = TempDir::new().unwrap();
        let store = YamlRosterStore::new(roster_path_at(home.path()));
        store.seed_sample(false).expect("first seed");
        let err = store.seed_sample(false).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }), "got: {err}");
        store.seed_sample(true).expect("forced seed");
    }

    #[test]
    fn save_cleans_up_tmp() {
        let home = TempDir::new().unwrap();
        let store = YamlRosterStore::new(roster_path_at(home.path()));
        store.seed_sample(false).expect("seed");
        let tmp = store.path().with_extension("yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn memory_store_orders_by_id() {
        let mut employees = sample_employees();
        employees.reverse();
        let records = MemoryStore::new(employees).extract().expect("extract");
        assert_eq!(records[0].employee_id.0, "EMP001");
    }

    #[test]
    fn duplicate_ids_are_schema_errors() {
        let mut employees = sample_employees();
        employees.push(employees[0].clone());
        let err = MemoryStore::new(employees).extract().unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
        assert!(err.to_string().contains("duplicate employee_id 'EMP001'"));
    }

    #[test]
    fn out_of_range_rates_are_schema_errors() {
        let mut employees = sample_employees();
        employees[2].tax_rate = Decimal::new(15, 1);
        let err = MemoryStore::new(employees).extract().unwrap_err();
        assert!(matches!(err, StoreError::Schema { .. }), "got: {err}");

        let mut employees = sample_employees();
        employees[0].overtime_rate = Decimal::new(9, 1);
        let err = MemoryStore::new(employees).extract().unwrap_err();
        assert!(err.to_string().contains("overtime_rate"));
    }

    #[test]
    fn negative_basic_pay_is_schema_error() {
        let mut employees = sample_employees();
        employees[0].basic_pay = Decimal::new(-1, 0);
        let err = MemoryStore::new(employees).extract().unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
    }

    #[test]
    fn max_currency_amount_is_two_pow_53_cents() {
        assert_eq!(MAX_CURRENCY_AMOUNT, Decimal::new(9_007_199_254_740_991, 2));
        assert_eq!(MAX_CURRENCY_AMOUNT.to_string(), "90071992547409.91");
    }

    #[test]
    fn amounts_above_wire_precision_are_schema_errors() {
        let too_large = MAX_CURRENCY_AMOUNT + Decimal::new(1, 2);
        for field in ["basic_pay", "health_insurance", "retirement_contribution"] {
            let mut employees = sample_employees();
            match field {
                "basic_pay" => employees[1].basic_pay = too_large,
                "health_insurance" => employees[1].health_insurance = too_large,
                _ => employees[1].retirement_contribution = too_large,
            }
            let err = MemoryStore::new(employees).extract().unwrap_err();
            assert_eq!(err.kind(), "SchemaError", "{field}");
            assert!(err.to_string().contains(field), "{field}: {err}");
        }
    }

    #[test]
    fn huge_basic_pay_is_rejected_before_compute() {
        let mut employees = sample_employees();
        employees[0].basic_pay = Decimal::from_i128_with_scale(70_000_000_000_000_000_000_000_000_000, 0);
        let err = MemoryStore::new(employees).extract().unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
    }

    #[test]
    fn largest_accepted_record_computes_without_overflow() {
        let mut employees = sample_employees();
        employees[0].basic_pay = MAX_CURRENCY_AMOUNT;
        employees[0].overtime_rate = MAX_OVERTIME_RATE;
        employees[0].health_insurance = MAX_CURRENCY_AMOUNT;
        employees[0].retirement_contribution = MAX_CURRENCY_AMOUNT;
        let records = MemoryStore::new(employees).extract().expect("extract");
        let record = crate::compute::compute(&records[0], 20);
        assert_eq!(record.net_pay, record.gross_pay - record.total_deductions());
    }

    #[test]
    fn overtime_rate_above_bound_is_schema_error() {
        let mut employees = sample_employees();
        employees[0].overtime_rate = MAX_OVERTIME_RATE + Decimal::ONE;
        let err = MemoryStore::new(employees).extract().unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
        assert!(err.to_string().contains("overtime_rate"));

        let mut employees = sample_employees();
        employees[0].overtime_rate = MAX_OVERTIME_RATE;
        MemoryStore::new(employees).extract().expect("bound is inclusive");
    }
}
