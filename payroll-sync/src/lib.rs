//! # payroll-sync
//!
//! Producer and reader sides of the payroll exchange channel.
//!
//! Call [`EtlOrchestrator::run`] to extract, compute and atomically publish a
//! snapshot; use [`SnapshotConsumer::reload`] to read the latest one back.

pub mod accounting;
pub mod config;
pub mod consumer;
pub mod error;
pub mod orchestrator;
pub mod publisher;

pub use config::PipelineConfig;
pub use consumer::{
    read_snapshot, summarize, AggregateTotals, LoadedSnapshot, ReloadOutcome, SnapshotConsumer,
};
pub use error::{ConfigError, EtlError, LoadError, PublishError};
pub use orchestrator::{ErrorInfo, EtlOrchestrator, EtlResult, EtlStatus};
pub use publisher::{PublishReceipt, SnapshotPublisher};
