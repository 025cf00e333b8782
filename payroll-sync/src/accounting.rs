//! Accounting export derived from a loaded snapshot.
//!
//! Written with the same atomic protocol as the exchange channel.

use std::path::Path;

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::Serialize;

use payroll_core::{PayrollRecord, PayrollSnapshot};

use crate::error::PublishError;
use crate::orchestrator::export_date_label;
use crate::publisher::{publish_json, PublishReceipt};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountingExport<'a> {
    pub export_date: String,
    pub period: &'a str,
    pub total_employees: usize,
    pub employees: Vec<AccountingEmployee<'a>>,
}

/// One `Employees[]` entry, keyed the same way as the envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountingEmployee<'a> {
    pub employee_id: &'a str,
    pub full_name: &'a str,
    pub department: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub basic_salary: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub overtime_pay: Decimal,
    pub overtime_hours: u32,
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

impl<'a> From<&'a PayrollRecord> for AccountingEmployee<'a> {
    fn from(record: &'a PayrollRecord) -> Self {
        Self {
            employee_id: &record.employee_id.0,
            full_name: &record.full_name,
            department: &record.department,
            basic_salary: record.basic_salary,
            overtime_pay: record.overtime_pay,
            overtime_hours: record.overtime_hours,
            gross_pay: record.gross_pay,
            tax_deduction: record.tax_deduction,
            insurance_deduction: record.insurance_deduction,
            retirement_deduction: record.retirement_deduction,
            net_pay: record.net_pay,
        }
    }
}

impl<'a> AccountingExport<'a> {
    pub fn from_snapshot(snapshot: &'a PayrollSnapshot, now: DateTime<Local>) -> Self {
        Self {
            export_date: export_date_label(now),
            period: &snapshot.payroll_period,
            total_employees: snapshot.total_employees,
            employees: snapshot.payroll_data.iter().map(AccountingEmployee::from).collect(),
        }
    }
}

pub fn write_accounting_export(
    snapshot: &PayrollSnapshot,
    path: &Path,
    now: DateTime<Local>,
) -> Result<PublishReceipt, PublishError> {
    let receipt = publish_json(path, &AccountingExport::from_snapshot(snapshot, now))?;
    tracing::info!("accounting export generated: {}", path.display());
    Ok(receipt)
}
