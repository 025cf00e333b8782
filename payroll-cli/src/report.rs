//! Console rendering of payroll snapshots.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{settings::Style, Table, Tabled};

use payroll_core::PayrollSnapshot;
use payroll_sync::{summarize, LoadError};

#[derive(Tabled)]
struct PayrollRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "department")]
    department: String,
    #[tabled(rename = "basic")]
    basic: String,
    #[tabled(rename = "overtime")]
    overtime: String,
    #[tabled(rename = "gross")]
    gross: String,
    #[tabled(rename = "tax")]
    tax: String,
    #[tabled(rename = "insurance")]
    insurance: String,
    #[tabled(rename = "retirement")]
    retirement: String,
    #[tabled(rename = "net pay")]
    net: String,
}

fn money(amount: Decimal) -> String {
    format!("{amount:.2}")
}

/// Per-employee table. Widths ignore ANSI escapes, so a red net-pay cell stays aligned.
fn payroll_table(snapshot: &PayrollSnapshot) -> String {
    let rows = snapshot.payroll_data.iter().map(|record| PayrollRow {
        id: record.employee_id.to_string(),
        name: record.full_name.clone(),
        department: record.department.clone(),
        basic: money(record.basic_salary),
        overtime: format!("{}h = {}", record.overtime_hours, money(record.overtime_pay)),
        gross: money(record.gross_pay),
        tax: money(record.tax_deduction),
        insurance: money(record.insurance_deduction),
        retirement: money(record.retirement_deduction),
        net: if record.net_pay < Decimal::ZERO {
            money(record.net_pay).as_str().red().to_string()
        } else {
            money(record.net_pay)
        },
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn print_report(snapshot: &PayrollSnapshot) {
    let rule = "=".repeat(80);
    println!("{rule}");
    println!("{}", "FINANCE DEPARTMENT - PAYROLL REPORT".bold());
    println!("{rule}");
    println!("Export Date:     {}", snapshot.export_date);
    println!("Export Source:   {}", snapshot.export_source);
    println!("Payroll Period:  {}", snapshot.payroll_period);
    println!("Total Employees: {}", snapshot.total_employees);

    if snapshot.payroll_data.is_empty() {
        println!("\nNo payroll records in this export.");
    } else {
        println!("{}", payroll_table(snapshot));
    }

    let totals = summarize(snapshot);
    println!("{rule}");
    println!("{}", "SUMMARY".bold());
    println!("{}", "-".repeat(80));
    println!("Total Gross Pay:    {:>15}", money(totals.total_gross));
    println!("Total Overtime:     {:>15}", money(totals.total_overtime));
    println!("Total Deductions:   {:>15}", money(totals.total_deductions));
    println!(
        "{}  {:>15}",
        "TOTAL NET PAYROLL:".bold(),
        money(totals.total_net).as_str().bold()
    );
    println!("{rule}");
}

pub fn print_load_failure(err: &LoadError) {
    println!(
        "{} latest payroll data could not be loaded [{}]: {err}",
        "✗".red(),
        err.kind()
    );
}
