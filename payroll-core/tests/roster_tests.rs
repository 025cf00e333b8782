//! Roster store error reporting and YAML compatibility tests.

use std::fs;

use payroll_core::{
    roster::{roster_path_at, EmployeeStore, YamlRosterStore},
    StoreError,
};
use rust_decimal::Decimal;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// 1. Load errors
// ---------------------------------------------------------------------------

#[test]
fn missing_roster_is_store_unavailable() {
    let home = TempDir::new().expect("tempdir");
    let store = YamlRosterStore::new(roster_path_at(home.path()));
    let err = store.extract().unwrap_err();
    assert!(matches!(err, StoreError::Unavailable { .. }), "got: {err}");
    assert_eq!(err.kind(), "StoreUnavailable");
    assert!(err.to_string().contains("employees.yaml"));
}

#[test]
fn corrupt_yaml_is_parse_error_with_path() {
    let home = TempDir::new().expect("tempdir");
    let path = roster_path_at(home.path());
    fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    fs::write(&path, b": : corrupt : yaml : !!!\n  - broken: [unclosed").expect("write");

    let err = YamlRosterStore::new(&path).extract().unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
    assert_eq!(err.kind(), "SchemaError");
    assert!(err.to_string().contains("employees.yaml"));
}

#[test]
fn row_missing_basic_pay_is_schema_error() {
    let home = TempDir::new().expect("tempdir");
    let path = roster_path_at(home.path());
    fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    fs::write(
        &path,
        "version: 1\nemployees:\n  - employee_id: EMP001\n    first_name: john\n    last_name: doe\n",
    )
    .expect("write");

    let err = YamlRosterStore::new(&path).extract().unwrap_err();
    assert_eq!(err.kind(), "SchemaError", "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Hand-written rosters
// ---------------------------------------------------------------------------

#[test]
fn hand_written_roster_accepts_numbers_and_strings() {
    let home = TempDir::new().expect("tempdir");
    let path = roster_path_at(home.path());
    fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    fs::write(
        &path,
        r#"version: 1
employees:
  - employee_id: EMP020
    first_name: grace
    last_name: hopper
    department: Research
    basic_pay: "7250.50"
    tax_rate: 0.2
  - employee_id: EMP010
    first_name: alan
    last_name: turing
    basic_pay: 6400
"#,
    )
    .expect("write");

    let records = YamlRosterStore::new(&path).extract().expect("extract");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].employee_id.0, "EMP010");
    assert_eq!(records[1].basic_pay, Decimal::new(725050, 2));
    assert_eq!(records[1].tax_rate, Decimal::new(2, 1));
    assert_eq!(records[0].department, "");
}

#[test]
fn empty_roster_extracts_nothing() {
    let home = TempDir::new().expect("tempdir");
    let path = roster_path_at(home.path());
    fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    fs::write(&path, "version: 1\nemployees: []\n").expect("write");

    let records = YamlRosterStore::new(&path).extract().expect("extract");
    assert!(records.is_empty());
}
