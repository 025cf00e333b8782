//! ETL orchestration: extract from the HR store, compute payroll, publish.
//!
//! One [`EtlOrchestrator::run`] makes at most one publish attempt. Any failure
//! before or during publish leaves the previously published snapshot visible.

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::Serialize;

use payroll_core::{
    compute, EmployeeStore, OvertimeSource, PayrollSnapshot, RawEmployeeRecord, StoreError,
};

use crate::config::PipelineConfig;
use crate::consumer::summarize;
use crate::error::EtlError;
use crate::publisher::SnapshotPublisher;

// ---------------------------------------------------------------------------
// ETL result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EtlStatus {
    Success,
    Failure,
}

/// Distinguishable error kind plus message, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

impl From<&EtlError> for ErrorInfo {
    fn from(err: &EtlError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Structured outcome of one ETL run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtlResult {
    pub status: EtlStatus,
    pub message: String,
    pub records_processed: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_net_payroll: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl EtlResult {
    pub fn is_success(&self) -> bool {
        self.status == EtlStatus::Success
    }

    fn failure(err: &EtlError) -> Self {
        Self {
            status: EtlStatus::Failure,
            message: format!("ETL process failed: {err}"),
            records_processed: 0,
            total_net_payroll: Decimal::ZERO,
            channel_path: None,
            digest: None,
            error: Some(ErrorInfo::from(err)),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives extract → transform → publish.
pub struct EtlOrchestrator {
    store: Arc<dyn EmployeeStore>,
    overtime: Box<dyn OvertimeSource>,
    publisher: SnapshotPublisher,
    export_source: String,
    extract_timeout: Duration,
}

impl EtlOrchestrator {
    pub fn new(
        config: &PipelineConfig,
        store: Arc<dyn EmployeeStore>,
        overtime: Box<dyn OvertimeSource>,
    ) -> Self {
        Self {
            store,
            overtime,
            publisher: SnapshotPublisher::new(&config.channel_path),
            export_source: config.export_source.clone(),
            extract_timeout: config.extract_timeout,
        }
    }

    pub fn publisher(&self) -> &SnapshotPublisher {
        &self.publisher
    }

    /// Run one ETL pass stamped with the current local time.
    pub fn run(&mut self) -> EtlResult {
        self.run_at(Local::now())
    }

    /// Run one ETL pass stamped with `now`.
    pub fn run_at(&mut self, now: DateTime<Local>) -> EtlResult {
        match self.try_run(now) {
            Ok(result) => result,
            Err(err) => {
                tracing::error!("[{}] {err}", err.kind());
                EtlResult::failure(&err)
            }
        }
    }

    fn try_run(&mut self, now: DateTime<Local>) -> Result<EtlResult, EtlError> {
        let raw = self.extract()?;
        let snapshot = self.transform(&raw, now);
        let totals = summarize(&snapshot);
        let receipt = self.publisher.publish(&snapshot)?;

        tracing::info!(
            "ETL run published {} records, total net payroll {}",
            totals.employees,
            totals.total_net
        );
        Ok(EtlResult {
            status: EtlStatus::Success,
            message: "ETL process completed successfully".to_string(),
            records_processed: snapshot.total_employees,
            total_net_payroll: totals.total_net,
            channel_path: Some(receipt.path),
            digest: Some(receipt.digest),
            error: None,
        })
    }

    /// Build the snapshot for `raw` without publishing it.
    pub fn transform(&mut self, raw: &[RawEmployeeRecord], now: DateTime<Local>) -> PayrollSnapshot {
        let records = raw
            .iter()
            .map(|employee| {
                let hours = self.overtime.overtime_hours(employee);
                compute(employee, hours)
            })
            .collect();
        PayrollSnapshot::new(
            export_date_label(now),
            self.export_source.clone(),
            payroll_period_label(now),
            records,
        )
    }

    /// Extract on a helper thread so a hung store cannot block past the deadline.
    fn extract(&self) -> Result<Vec<RawEmployeeRecord>, StoreError> {
        let store = Arc::clone(&self.store);
        let location = store.location();
        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("payroll-extract".to_string())
            .spawn(move || {
                let _ = tx.send(store.extract());
            })
            .map_err(|err| StoreError::Unavailable {
                location: location.clone(),
                reason: format!("cannot start extraction: {err}"),
            })?;

        match rx.recv_timeout(self.extract_timeout) {
            Ok(result) => {
                let records = result?;
                tracing::debug!("extracted {} employees from {location}", records.len());
                Ok(records)
            }
            Err(RecvTimeoutError::Timeout) => Err(StoreError::Unavailable {
                location,
                reason: format!(
                    "extraction exceeded the {} ms deadline",
                    self.extract_timeout.as_millis()
                ),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::Unavailable {
                location,
                reason: "extraction ended without a result".to_string(),
            }),
        }
    }
}

/// `2026-10-19 09:30:00`
pub fn export_date_label(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `October 2026`
pub fn payroll_period_label(now: DateTime<Local>) -> String {
    now.format("%B %Y").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use payroll_core::{roster::sample_employees, FixedOvertime, MemoryStore};
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn orchestrator(home: &TempDir, store: Arc<dyn EmployeeStore>) -> EtlOrchestrator {
        let config = PipelineConfig::defaults_at(home.path());
        EtlOrchestrator::new(&config, store, Box::new(FixedOvertime::new(10)))
    }

    #[test]
    fn labels_follow_export_format() {
        assert_eq!(export_date_label(fixed_now()), "2026-10-19 09:30:00");
        assert_eq!(payroll_period_label(fixed_now()), "October 2026");
    }

    #[test]
    fn transform_preserves_extraction_order() {
        let home = TempDir::new().unwrap();
        let mut etl = orchestrator(&home, Arc::new(MemoryStore::default()));
        let snapshot = etl.transform(&sample_employees(), fixed_now());
        let ids: Vec<&str> = snapshot
            .payroll_data
            .iter()
            .map(|r| r.employee_id.0.as_str())
            .collect();
        assert_eq!(ids, ["EMP001", "EMP002", "EMP003", "EMP004"]);
        assert_eq!(snapshot.total_employees, 4);
        assert_eq!(snapshot.payroll_period, "October 2026");
    }

    #[test]
    fn run_reports_net_total() {
        let home = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new(vec![sample_employees().remove(0)]));
        let mut etl = orchestrator(&home, store);
        let result = etl.run_at(fixed_now());
        assert!(result.is_success(), "{result:?}");
        assert_eq!(result.records_processed, 1);
        assert_eq!(result.total_net_payroll, Decimal::new(421875, 2));
        assert!(result.error.is_none());
    }

    #[test]
    fn result_serializes_lowercase_status() {
        let home = TempDir::new().unwrap();
        let mut etl = orchestrator(&home, Arc::new(MemoryStore::default()));
        let value = serde_json::to_value(etl.run_at(fixed_now())).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["records_processed"], 0);
    }
}
