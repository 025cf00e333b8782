//! Payroll computation: one raw employee record in, one payroll record out.
//!
//! Every derived amount is rounded to cents (half away from zero) before it
//! feeds the next formula, so totals match a step-by-step reference
//! calculation rather than a single final rounding.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{PayrollRecord, RawEmployeeRecord};

/// Standard working hours in a month; basic pay divided by this is the hourly rate.
pub const STANDARD_MONTHLY_HOURS: u32 = 160;

/// Round a currency amount to 2 fractional digits.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Unrounded hourly rate derived from monthly basic pay.
pub fn hourly_rate(basic_pay: Decimal) -> Decimal {
    basic_pay / Decimal::from(STANDARD_MONTHLY_HOURS)
}

pub fn overtime_pay(basic_pay: Decimal, overtime_hours: u32, overtime_rate: Decimal) -> Decimal {
    round_currency(Decimal::from(overtime_hours) * hourly_rate(basic_pay) * overtime_rate)
}

pub fn gross_pay(basic_pay: Decimal, overtime_pay: Decimal) -> Decimal {
    round_currency(basic_pay + overtime_pay)
}

/// Tax is levied on basic pay only; overtime is not taxed.
pub fn tax_deduction(basic_pay: Decimal, tax_rate: Decimal) -> Decimal {
    round_currency(basic_pay * tax_rate)
}

/// Net pay is never clamped; deductions larger than gross yield a negative amount.
pub fn net_pay(
    gross_pay: Decimal,
    tax_deduction: Decimal,
    insurance: Decimal,
    retirement: Decimal,
) -> Decimal {
    round_currency(gross_pay - (tax_deduction + insurance + retirement))
}

/// Compute the payroll record for one employee.
///
/// `overtime_hours` is supplied by the caller, which keeps this function
/// deterministic.
pub fn compute(raw: &RawEmployeeRecord, overtime_hours: u32) -> PayrollRecord {
    let overtime = overtime_pay(raw.basic_pay, overtime_hours, raw.overtime_rate);
    let gross = gross_pay(raw.basic_pay, overtime);
    let tax = tax_deduction(raw.basic_pay, raw.tax_rate);
    let net = net_pay(
        gross,
        tax,
        raw.health_insurance,
        raw.retirement_contribution,
    );

    PayrollRecord {
        employee_id: raw.employee_id.clone(),
        full_name: display_name(&raw.first_name, &raw.last_name),
        department: raw.department.clone(),
        basic_salary: raw.basic_pay,
        overtime_hours,
        overtime_pay: overtime,
        gross_pay: gross,
        tax_deduction: tax,
        insurance_deduction: raw.health_insurance,
        retirement_deduction: raw.retirement_contribution,
        net_pay: net,
    }
}

/// `"  jOHN "`, `"doe"` → `"John Doe"`.
pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", capitalize_words(first_name), capitalize_words(last_name))
}

fn capitalize_words(part: &str) -> String {
    let lowered = part.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut at_word_start = true;
    for ch in lowered.chars() {
        if at_word_start && !ch.is_whitespace() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace();
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmployeeId;
    use rstest::rstest;

    fn raw(basic_pay: Decimal) -> RawEmployeeRecord {
        RawEmployeeRecord {
            employee_id: EmployeeId::from("EMP001"),
            first_name: "john".into(),
            last_name: "doe".into(),
            department: "Engineering".into(),
            basic_pay,
            overtime_rate: Decimal::new(15, 1),
            tax_rate: Decimal::new(15, 2),
            health_insurance: Decimal::new(20000, 2),
            retirement_contribution: Decimal::new(30000, 2),
        }
    }

    #[test]
    fn reference_example_matches_step_by_step_figures() {
        let basic = Decimal::new(500000, 2);
        assert_eq!(hourly_rate(basic), Decimal::new(3125, 2));

        let record = compute(&raw(basic), 10);
        assert_eq!(record.overtime_pay, Decimal::new(46875, 2));
        assert_eq!(record.gross_pay, Decimal::new(546875, 2));
        assert_eq!(record.tax_deduction, Decimal::new(75000, 2));
        assert_eq!(record.net_pay, Decimal::new(421875, 2));
        assert_eq!(record.full_name, "John Doe");
        assert_eq!(record.overtime_hours, 10);
    }

    #[test]
    fn zero_overtime_leaves_gross_equal_to_basic() {
        let record = compute(&raw(Decimal::new(450000, 2)), 0);
        assert_eq!(record.overtime_pay, Decimal::ZERO);
        assert_eq!(record.gross_pay, Decimal::new(450000, 2));
    }

    #[test]
    fn tax_ignores_overtime() {
        let without = compute(&raw(Decimal::new(600000, 2)), 0);
        let with = compute(&raw(Decimal::new(600000, 2)), 20);
        assert_eq!(without.tax_deduction, with.tax_deduction);
        assert!(with.gross_pay > without.gross_pay);
    }

    #[test]
    fn net_pay_goes_negative_without_clamping() {
        let record = compute(&raw(Decimal::new(10000, 2)), 0);
        // 100.00 - (15.00 + 200.00 + 300.00)
        assert_eq!(record.net_pay, Decimal::new(-41500, 2));
    }

    #[test]
    fn overtime_pay_rounds_half_away_from_zero() {
        // 1 * (1001 / 160) * 1 = 6.25625 → 6.26
        let pay = overtime_pay(Decimal::new(1001, 0), 1, Decimal::ONE);
        assert_eq!(pay, Decimal::new(626, 2));
        // 1 * (1000.80 / 160) * 1 = 6.255 → 6.26
        let pay = overtime_pay(Decimal::new(100080, 2), 1, Decimal::ONE);
        assert_eq!(pay, Decimal::new(626, 2));
    }

    #[rstest]
    #[case("john", "doe", "John Doe")]
    #[case("  ALICE ", "williams", "Alice Williams")]
    #[case("mary ann", "o'neil", "Mary Ann O'neil")]
    #[case("", "smith", " Smith")]
    fn display_name_capitalizes_each_word(
        #[case] first: &str,
        #[case] last: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(display_name(first, last), expected);
    }
}
