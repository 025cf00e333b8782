//! Response envelope for the read-only snapshot endpoint.
//!
//! `{"status": "success", "data": <snapshot>}` or
//! `{"status": "error", "message": "..."}`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use payroll_core::PayrollSnapshot;
use payroll_sync::{read_snapshot, LoadError};

pub const NO_DATA_MESSAGE: &str = "No payroll data available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse {
    Success { data: PayrollSnapshot },
    Error { message: String },
}

impl ApiResponse {
    pub fn ok(data: PayrollSnapshot) -> Self {
        ApiResponse::Success { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Envelope for the latest published snapshot.
pub fn latest_snapshot_response(channel_path: &Path) -> ApiResponse {
    match read_snapshot(channel_path) {
        Ok(loaded) => ApiResponse::ok(loaded.snapshot),
        Err(LoadError::NotFound { .. }) => ApiResponse::error(NO_DATA_MESSAGE),
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "snapshot read failed");
            ApiResponse::error(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payroll_sync::SnapshotPublisher;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn absent_channel_yields_error_envelope() {
        let tmp = TempDir::new().unwrap();
        let response = latest_snapshot_response(&tmp.path().join("payroll_export.json"));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"status": "error", "message": "No payroll data available"})
        );
    }

    #[test]
    fn published_channel_yields_success_envelope() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("payroll_export.json");
        let snapshot = PayrollSnapshot::new("2026-10-19 09:00:00", "HR System", "October 2026", vec![]);
        SnapshotPublisher::new(&path).publish(&snapshot).unwrap();

        let value = serde_json::to_value(latest_snapshot_response(&path)).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["export_source"], "HR System");
        assert_eq!(value["data"]["total_employees"], 0);
    }

    #[test]
    fn malformed_channel_yields_error_with_reason() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("payroll_export.json");
        std::fs::write(&path, "[]").unwrap();

        match latest_snapshot_response(&path) {
            ApiResponse::Error { message } => assert!(message.contains("malformed")),
            other => panic!("expected error, got {other:?}"),
        }
    }
}
