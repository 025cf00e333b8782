//! Domain types for the payroll pipeline.
//!
//! Currency amounts are [`Decimal`] in memory and plain JSON/YAML numbers on
//! the wire (`rust_decimal::serde::float`), matching the exchange file format
//! the finance side reads.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identity of an employee in the system-of-record (e.g. `EMP001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EmployeeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EmployeeId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Raw employee record (system-of-record side)
// ---------------------------------------------------------------------------

pub fn default_overtime_rate() -> Decimal {
    Decimal::new(15, 1)
}

pub fn default_tax_rate() -> Decimal {
    Decimal::new(15, 2)
}

pub fn default_health_insurance() -> Decimal {
    Decimal::new(20000, 2)
}

pub fn default_retirement_contribution() -> Decimal {
    Decimal::new(30000, 2)
}

/// One employee row as held by the HR store. Read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEmployeeRecord {
    pub employee_id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub basic_pay: Decimal,
    /// Multiplier applied to the hourly rate for overtime hours (>= 1.0).
    #[serde(default = "default_overtime_rate", with = "rust_decimal::serde::float")]
    pub overtime_rate: Decimal,
    /// Fraction of basic pay withheld as tax, in `[0, 1]`.
    #[serde(default = "default_tax_rate", with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    #[serde(
        default = "default_health_insurance",
        with = "rust_decimal::serde::float"
    )]
    pub health_insurance: Decimal,
    #[serde(
        default = "default_retirement_contribution",
        with = "rust_decimal::serde::float"
    )]
    pub retirement_contribution: Decimal,
}

// ---------------------------------------------------------------------------
// Payroll record and snapshot (exchange channel side)
// ---------------------------------------------------------------------------

/// Derived payroll line for one employee. Immutable once computed.
///
/// `gross_pay = basic_salary + overtime_pay` and
/// `net_pay = gross_pay - (tax_deduction + insurance_deduction + retirement_deduction)`.
/// `net_pay` may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub employee_id: EmployeeId,
    pub full_name: String,
    pub department: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub basic_salary: Decimal,
    pub overtime_hours: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub overtime_pay: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_pay: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_deduction: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub insurance_deduction: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub retirement_deduction: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_pay: Decimal,
}

impl PayrollRecord {
    /// Sum of the three deductions.
    pub fn total_deductions(&self) -> Decimal {
        self.tax_deduction + self.insurance_deduction + self.retirement_deduction
    }
}

/// One complete export of computed payroll records.
///
/// Field names and order are the exchange file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSnapshot {
    pub export_date: String,
    pub export_source: String,
    pub payroll_period: String,
    pub total_employees: usize,
    pub payroll_data: Vec<PayrollRecord>,
}

impl PayrollSnapshot {
    /// Assemble a snapshot; `total_employees` always equals `records.len()`.
    pub fn new(
        export_date: impl Into<String>,
        export_source: impl Into<String>,
        payroll_period: impl Into<String>,
        records: Vec<PayrollRecord>,
    ) -> Self {
        Self {
            export_date: export_date.into(),
            export_source: export_source.into(),
            payroll_period: payroll_period.into(),
            total_employees: records.len(),
            payroll_data: records,
        }
    }

    /// `true` when the declared employee count matches the record list.
    pub fn is_consistent(&self) -> bool {
        self.total_employees == self.payroll_data.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(EmployeeId::from("EMP001").to_string(), "EMP001");
    }

    #[test]
    fn employee_ids_order_lexically() {
        let mut ids = vec![EmployeeId::from("EMP010"), EmployeeId::from("EMP002")];
        ids.sort();
        assert_eq!(ids[0].0, "EMP002");
    }

    #[test]
    fn raw_record_defaults_fill_missing_rates() {
        let yaml = "employee_id: EMP009\nfirst_name: ada\nlast_name: lovelace\nbasic_pay: 4000\n";
        let raw: RawEmployeeRecord = serde_yaml::from_str(yaml).expect("deserialize");
        assert_eq!(raw.overtime_rate, Decimal::new(15, 1));
        assert_eq!(raw.tax_rate, Decimal::new(15, 2));
        assert_eq!(raw.health_insurance, Decimal::new(200, 0));
        assert_eq!(raw.retirement_contribution, Decimal::new(300, 0));
        assert_eq!(raw.department, "");
    }

    #[test]
    fn snapshot_new_counts_records() {
        let snapshot = PayrollSnapshot::new("2026-10-19 09:00:00", "HR System", "October 2026", vec![]);
        assert_eq!(snapshot.total_employees, 0);
        assert!(snapshot.is_consistent());
    }

    #[test]
    fn snapshot_serializes_currency_as_numbers() {
        let record = PayrollRecord {
            employee_id: EmployeeId::from("EMP001"),
            full_name: "John Doe".into(),
            department: "Engineering".into(),
            basic_salary: Decimal::new(500000, 2),
            overtime_hours: 10,
            overtime_pay: Decimal::new(46875, 2),
            gross_pay: Decimal::new(546875, 2),
            tax_deduction: Decimal::new(75000, 2),
            insurance_deduction: Decimal::new(20000, 2),
            retirement_deduction: Decimal::new(30000, 2),
            net_pay: Decimal::new(421875, 2),
        };
        let snapshot = PayrollSnapshot::new("d", "s", "p", vec![record]);
        let value = serde_json::to_value(&snapshot).expect("serialize");
        assert_eq!(value["total_employees"], 1);
        let row = &value["payroll_data"][0];
        assert_eq!(row["employee_id"], "EMP001");
        assert!(row["net_pay"].is_number());
        assert_eq!(row["net_pay"].as_f64(), Some(4218.75));
        assert_eq!(row["overtime_hours"], 10);
    }
}
