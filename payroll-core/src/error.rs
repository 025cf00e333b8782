//! Error types for payroll-core.

use std::path::PathBuf;

use thiserror::Error;

/// Failures at the system-of-record boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached: missing roster, I/O failure, or the
    /// extraction deadline elapsed.
    #[error("employee store unavailable at {location}: {reason}")]
    Unavailable { location: String, reason: String },

    /// A row was read but does not fit the employee schema.
    #[error("schema error in {location}: {reason}")]
    Schema { location: String, reason: String },

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse roster at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Refused to overwrite an existing roster while seeding.
    #[error("roster already exists at {path}; pass --force to overwrite")]
    AlreadyExists { path: PathBuf },

    /// I/O failure while writing the roster.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (seed/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StoreError {
    /// Stable error kind reported in ETL results and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } | StoreError::Io { .. } => "StoreUnavailable",
            StoreError::Schema { .. } | StoreError::Parse { .. } | StoreError::Yaml(_) => {
                "SchemaError"
            }
            StoreError::AlreadyExists { .. } => "StoreUnavailable",
        }
    }

    pub(crate) fn unavailable(location: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Unavailable {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn schema(location: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Schema {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
