//! Atomic snapshot publisher.
//!
//! ## `write_atomic` — publish protocol
//!
//! 1. Serialize the document (pretty JSON).
//! 2. SHA-256 hash the bytes.
//! 3. Write to `<path>.payroll.tmp` in the channel's own directory.
//! 4. `fsync` the temporary file.
//! 5. Rename onto the final path (atomic on POSIX); readers see the old or
//!    the new document, never a prefix of either.
//!
//! A failure at any step removes the temporary file and leaves the previously
//! published document in place.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use payroll_core::PayrollSnapshot;

use crate::error::{io_err, PublishError};

/// Suffix of the temporary sibling used during a publish.
pub const TMP_SUFFIX: &str = ".payroll.tmp";

// ---------------------------------------------------------------------------
// Publish receipt
// ---------------------------------------------------------------------------

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub path: PathBuf,
    /// Hex SHA-256 of the published bytes.
    pub digest: String,
    pub bytes: usize,
}

// ---------------------------------------------------------------------------
// SnapshotPublisher
// ---------------------------------------------------------------------------

/// Writes snapshots into the exchange channel.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    channel_path: PathBuf,
}

impl SnapshotPublisher {
    pub fn new(channel_path: impl Into<PathBuf>) -> Self {
        Self {
            channel_path: channel_path.into(),
        }
    }

    pub fn channel_path(&self) -> &Path {
        &self.channel_path
    }

    /// Replace the published snapshot with `snapshot`.
    ///
    /// Publishing the same snapshot twice produces identical bytes; the
    /// modification time still advances because the file is replaced.
    pub fn publish(&self, snapshot: &PayrollSnapshot) -> Result<PublishReceipt, PublishError> {
        let receipt = publish_json(&self.channel_path, snapshot)?;
        tracing::info!(
            "published {} payroll records to {} (sha256 {})",
            snapshot.payroll_data.len(),
            receipt.path.display(),
            receipt.digest
        );
        Ok(receipt)
    }
}

/// Serialize `value` as pretty JSON and publish it atomically at `path`.
pub fn publish_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<PublishReceipt, PublishError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes)?;
    Ok(PublishReceipt {
        path: path.to_path_buf(),
        digest: content_digest(&bytes),
        bytes: bytes.len(),
    })
}

/// Hex SHA-256 of `bytes`.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// `<path>.payroll.tmp`
pub fn tmp_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}{TMP_SUFFIX}", path.display()))
}

pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), PublishError> {
    write_atomic_with_tmp(path, content, &tmp_path_for(path))
}

fn write_atomic_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), PublishError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    if let Err(err) = write_and_sync(tmp, content) {
        let _ = std::fs::remove_file(tmp);
        return Err(err);
    }

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::debug!("replaced {}", path.display());
    Ok(())
}

fn write_and_sync(tmp: &Path, content: &[u8]) -> Result<(), PublishError> {
    let mut file = File::create(tmp).map_err(|e| io_err(tmp, e))?;
    file.write_all(content).map_err(|e| io_err(tmp, e))?;
    file.sync_all().map_err(|e| io_err(tmp, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
