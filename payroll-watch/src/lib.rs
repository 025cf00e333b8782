//! Payroll watch runtime: debounced change watcher over the exchange channel.

mod error;
pub mod protocol;
pub mod runtime;
pub mod watcher;

pub use error::WatchError;
pub use protocol::{latest_snapshot_response, ApiResponse};
pub use runtime::{run, start_blocking, watch_channel, WatchSession};
pub use watcher::{
    ChangeNotice, ChangeWatcher, Debouncer, ReloadTrigger, WatchCommand, WatchEvent, WatchState,
};
