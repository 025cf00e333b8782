//! Error types for payroll-sync.

use std::path::PathBuf;

use thiserror::Error;

use payroll_core::StoreError;

/// Failure to publish a file into the exchange channel (or a derived export).
#[derive(Debug, Error)]
pub enum PublishError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PublishError {
    pub fn kind(&self) -> &'static str {
        "PublishError"
    }
}

/// Failure of one ETL run. The previously published snapshot is untouched.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("extract failed: {0}")]
    Extract(#[from] StoreError),

    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
}

impl EtlError {
    pub fn kind(&self) -> &'static str {
        match self {
            EtlError::Extract(err) => err.kind(),
            EtlError::Publish(err) => err.kind(),
        }
    }
}

/// Failure to read the latest snapshot from the exchange channel.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Nothing has ever been published to the channel.
    #[error("no payroll snapshot published at {path}")]
    NotFound { path: PathBuf },

    /// The document did not deserialize or violates the snapshot invariant.
    #[error("malformed payroll snapshot at {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// The file exists but could not be read after retrying.
    #[error("unreadable payroll snapshot at {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::NotFound { .. } => "NotFound",
            LoadError::Malformed { .. } => "Malformed",
            LoadError::Unreadable { .. } => "Unreadable",
        }
    }
}

/// Failure to resolve the pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `dirs::home_dir()` returned `None` — cannot locate `~/.payroll/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience constructor for [`PublishError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.into(),
        source,
    }
}
