//! Snapshot consumer: reads the exchange channel and keeps the last good
//! snapshot in memory.
//!
//! Only [`SnapshotConsumer::reload`] replaces the cached snapshot, and it does
//! so with a single `Arc` swap; concurrent readers of [`SnapshotConsumer::current`]
//! see either the old or the new snapshot in full.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::sleep;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use payroll_core::PayrollSnapshot;

use crate::error::LoadError;
use crate::publisher::content_digest;

/// Read attempts before an I/O failure is reported as [`LoadError::Unreadable`].
pub const READ_ATTEMPTS: u32 = 3;
pub const READ_RETRY_DELAY: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Totals across every record of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregateTotals {
    pub employees: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_gross: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_overtime: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_deductions: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_net: Decimal,
}

/// Sum gross, overtime, deductions and net pay across all records.
pub fn summarize(snapshot: &PayrollSnapshot) -> AggregateTotals {
    snapshot.payroll_data.iter().fold(
        AggregateTotals {
            employees: 0,
            total_gross: Decimal::ZERO,
            total_overtime: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            total_net: Decimal::ZERO,
        },
        |mut totals, record| {
            totals.employees += 1;
            totals.total_gross += record.gross_pay;
            totals.total_overtime += record.overtime_pay;
            totals.total_deductions += record.total_deductions();
            totals.total_net += record.net_pay;
            totals
        },
    )
}

// ---------------------------------------------------------------------------
// Loaded snapshot
// ---------------------------------------------------------------------------

/// A validated snapshot together with the digest of the bytes it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub snapshot: PayrollSnapshot,
    pub digest: String,
    pub loaded_at: DateTime<Utc>,
}

/// Result of a successful reload.
#[derive(Debug, Clone)]
pub struct ReloadOutcome {
    pub loaded: Arc<LoadedSnapshot>,
    /// `false` when the content digest equals the previously cached one.
    pub changed: bool,
}

/// Read, parse and validate the snapshot at `path` without touching any cache.
///
/// Blocking: a transient read error is retried, sleeping up to
/// `(READ_ATTEMPTS - 1) * READ_RETRY_DELAY` in total. Async callers should
/// run it on a blocking thread.
pub fn read_snapshot(path: &Path) -> Result<LoadedSnapshot, LoadError> {
    let bytes = read_with_retry(path, READ_ATTEMPTS, READ_RETRY_DELAY)?;
    let snapshot: PayrollSnapshot =
        serde_json::from_slice(&bytes).map_err(|err| LoadError::Malformed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    if !snapshot.is_consistent() {
        return Err(LoadError::Malformed {
            path: path.to_path_buf(),
            reason: format!(
                "total_employees is {} but payroll_data has {} records",
                snapshot.total_employees,
                snapshot.payroll_data.len()
            ),
        });
    }
    Ok(LoadedSnapshot {
        snapshot,
        digest: content_digest(&bytes),
        loaded_at: Utc::now(),
    })
}

fn read_with_retry(path: &Path, attempts: u32, delay: Duration) -> Result<Vec<u8>, LoadError> {
    let mut attempt = 1;
    loop {
        match std::fs::read(path) {
            Ok(bytes) => return Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(LoadError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(err) if attempt < attempts => {
                tracing::debug!(
                    "transient read failure on {} (attempt {attempt}): {err}",
                    path.display()
                );
                attempt += 1;
                sleep(delay);
            }
            Err(source) => {
                return Err(LoadError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SnapshotConsumer
// ---------------------------------------------------------------------------

/// Reader of the exchange channel holding the last good snapshot.
#[derive(Debug)]
pub struct SnapshotConsumer {
    channel_path: PathBuf,
    cache: RwLock<Option<Arc<LoadedSnapshot>>>,
}

impl SnapshotConsumer {
    pub fn new(channel_path: impl Into<PathBuf>) -> Self {
        Self {
            channel_path: channel_path.into(),
            cache: RwLock::new(None),
        }
    }

    pub fn channel_path(&self) -> &Path {
        &self.channel_path
    }

    /// Read the latest snapshot and replace the cached one.
    ///
    /// On error the cached snapshot is left exactly as it was.
    pub fn reload(&self) -> Result<ReloadOutcome, LoadError> {
        let loaded = Arc::new(read_snapshot(&self.channel_path)?);
        let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let changed = guard
            .as_ref()
            .map_or(true, |previous| previous.digest != loaded.digest);
        *guard = Some(Arc::clone(&loaded));
        drop(guard);

        tracing::info!(
            "loaded payroll snapshot from {} ({} employees, period {}, changed: {changed})",
            self.channel_path.display(),
            loaded.snapshot.total_employees,
            loaded.snapshot.payroll_period
        );
        Ok(ReloadOutcome { loaded, changed })
    }

    /// The last successfully loaded snapshot, if any.
    pub fn current(&self) -> Option<Arc<LoadedSnapshot>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Totals of the cached snapshot.
    pub fn current_totals(&self) -> Option<AggregateTotals> {
        self.current().map(|loaded| summarize(&loaded.snapshot))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
