//! Debounced change watcher.
//!
//! ```text
//! Idle ──notice──▶ PendingChange ──(no notice for `delay`)──▶ Reloading ──▶ Idle
//!                    ▲      │
//!                    └notice┘ (timer restarts)
//! ```
//!
//! Only explicit shutdown ends the loop. A pending timer is dropped on
//! shutdown without firing.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use payroll_sync::{LoadError, LoadedSnapshot, SnapshotConsumer};

use crate::error::WatchError;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A modification notification for the exchange channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadTrigger {
    Initial,
    Watcher,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    /// Reload immediately, bypassing the debounce timer.
    Reload(ReloadTrigger),
}

/// Outcome of one reload, emitted to the watch session owner.
#[derive(Debug)]
pub enum WatchEvent {
    Reloaded {
        trigger: ReloadTrigger,
        loaded: Arc<LoadedSnapshot>,
        changed: bool,
    },
    /// The cached snapshot is unchanged.
    ReloadFailed {
        trigger: ReloadTrigger,
        error: LoadError,
    },
}

impl WatchEvent {
    pub fn trigger(&self) -> ReloadTrigger {
        match self {
            WatchEvent::Reloaded { trigger, .. } | WatchEvent::ReloadFailed { trigger, .. } => {
                *trigger
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchState {
    Idle,
    PendingChange,
    Reloading,
}

/// Timer state for coalescing bursts of notices into one reload.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    state: WatchState,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: WatchState::Idle,
            deadline: None,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A notice arrived: start or restart the timer.
    pub fn notify(&mut self, now: Instant) {
        self.state = WatchState::PendingChange;
        self.deadline = Some(now + self.delay);
    }

    /// Enter `Reloading` if the timer has expired. Returns `true` on transition.
    pub fn fire(&mut self, now: Instant) -> bool {
        match (self.state, self.deadline) {
            (WatchState::PendingChange, Some(deadline)) if now >= deadline => {
                self.state = WatchState::Reloading;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Reload finished (successfully or not).
    pub fn finish(&mut self) {
        self.state = WatchState::Idle;
    }

    /// Drop a pending timer without firing.
    pub fn cancel(&mut self) {
        self.state = WatchState::Idle;
        self.deadline = None;
    }
}

// ---------------------------------------------------------------------------
// ChangeWatcher
// ---------------------------------------------------------------------------

/// Turns change notices and manual commands into consumer reloads.
#[derive(Debug)]
pub struct ChangeWatcher {
    consumer: Arc<SnapshotConsumer>,
    debounce: Duration,
}

impl ChangeWatcher {
    pub fn new(consumer: Arc<SnapshotConsumer>, debounce: Duration) -> Self {
        Self { consumer, debounce }
    }

    /// Run until `shutdown_rx` fires or the notice source goes away.
    pub async fn run(
        self,
        mut notices: mpsc::UnboundedReceiver<ChangeNotice>,
        mut commands: mpsc::Receiver<WatchCommand>,
        events: mpsc::UnboundedSender<WatchEvent>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), WatchError> {
        let mut debouncer = Debouncer::new(self.debounce);
        let mut commands_open = true;

        loop {
            let deadline = debouncer.deadline();
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                notice = notices.recv() => {
                    let Some(notice) = notice else { break };
                    tracing::debug!(path = %notice.path.display(), "change notice");
                    debouncer.notify(Instant::now());
                }
                command = commands.recv(), if commands_open => match command {
                    Some(WatchCommand::Reload(trigger)) => self.reload(trigger, &events).await,
                    None => commands_open = false,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if debouncer.fire(Instant::now()) {
                        self.reload(ReloadTrigger::Watcher, &events).await;
                        debouncer.finish();
                    }
                }
            }
        }

        if debouncer.state() == WatchState::PendingChange {
            tracing::debug!("dropping pending reload on shutdown");
        }
        debouncer.cancel();
        Ok(())
    }

    /// The read retries with short sleeps, so it runs on the blocking pool.
    async fn reload(&self, trigger: ReloadTrigger, events: &mpsc::UnboundedSender<WatchEvent>) {
        let consumer = Arc::clone(&self.consumer);
        let result = match tokio::task::spawn_blocking(move || consumer.reload()).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(trigger = ?trigger, error = %err, "reload task failed");
                return;
            }
        };
        let event = match result {
            Ok(outcome) => {
                tracing::info!(
                    trigger = ?trigger,
                    digest = %outcome.loaded.digest,
                    changed = outcome.changed,
                    records = outcome.loaded.snapshot.total_employees,
                    "payroll snapshot reloaded",
                );
                WatchEvent::Reloaded {
                    trigger,
                    loaded: outcome.loaded,
                    changed: outcome.changed,
                }
            }
            Err(error) => {
                tracing::warn!(
                    trigger = ?trigger,
                    kind = error.kind(),
                    error = %error,
                    "payroll snapshot reload failed; keeping last good snapshot",
                );
                WatchEvent::ReloadFailed { trigger, error }
            }
        };
        let _ = events.send(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
