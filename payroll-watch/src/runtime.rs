//! Watch runtime: `notify` wiring, session lifecycle, interactive loop.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use payroll_sync::{PipelineConfig, SnapshotConsumer};

use crate::error::{io_err, WatchError};
use crate::watcher::{ChangeNotice, ChangeWatcher, ReloadTrigger, WatchCommand, WatchEvent};

/// Interactive keys understood by [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Reload,
    Quit,
}

/// `r` / `reload` and `q` / `quit`, case-insensitive.
pub fn parse_key(line: &str) -> Option<KeyCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "reload" => Some(KeyCommand::Reload),
        "q" | "quit" => Some(KeyCommand::Quit),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Channel watcher registration
// ---------------------------------------------------------------------------

/// Register an OS-level watcher on the channel's directory.
///
/// The directory is watched rather than the file because a publish replaces
/// the file's inode. Only events naming the channel file itself are forwarded;
/// the publisher's temporary sibling is ignored. Dropping the returned watcher
/// unregisters it.
pub fn watch_channel(
    channel_path: &Path,
    notices: mpsc::UnboundedSender<ChangeNotice>,
) -> Result<RecommendedWatcher, WatchError> {
    let dir = channel_dir(channel_path);
    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    }
    let file_name: OsString = channel_path
        .file_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            io_err(
                channel_path,
                std::io::Error::other("channel path has no file name"),
            )
        })?;

    let mut watcher = recommended_watcher(move |event: notify::Result<Event>| {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "watcher event error");
                return;
            }
        };
        if !is_relevant_event_kind(&event.kind) {
            return;
        }
        for path in event.paths {
            if path.file_name() == Some(file_name.as_os_str()) {
                let _ = notices.send(ChangeNotice { path });
            }
        }
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    tracing::debug!(path = %dir.display(), "watching exchange channel directory");
    Ok(watcher)
}

fn channel_dir(channel_path: &Path) -> std::path::PathBuf {
    match channel_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    }
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A running [`ChangeWatcher`] with its OS watcher and channels.
pub struct WatchSession {
    consumer: Arc<SnapshotConsumer>,
    commands: mpsc::Sender<WatchCommand>,
    events: mpsc::UnboundedReceiver<WatchEvent>,
    shutdown: broadcast::Sender<()>,
    handle: JoinHandle<Result<(), WatchError>>,
    watcher: Option<RecommendedWatcher>,
}

impl WatchSession {
    /// Start watching `config.channel_path`. Must be called inside a tokio runtime.
    pub fn start(config: &PipelineConfig) -> Result<Self, WatchError> {
        let consumer = Arc::new(SnapshotConsumer::new(&config.channel_path));
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel(4);

        let watcher = watch_channel(&config.channel_path, notice_tx)?;
        let change_watcher = ChangeWatcher::new(Arc::clone(&consumer), config.debounce);
        let handle = tokio::spawn(change_watcher.run(
            notice_rx,
            command_rx,
            event_tx,
            shutdown_tx.subscribe(),
        ));

        tracing::info!(
            path = %config.channel_path.display(),
            debounce_ms = config.debounce.as_millis() as u64,
            "monitoring payroll exchange channel",
        );
        Ok(Self {
            consumer,
            commands: command_tx,
            events: event_rx,
            shutdown: shutdown_tx,
            handle,
            watcher: Some(watcher),
        })
    }

    pub fn consumer(&self) -> &Arc<SnapshotConsumer> {
        &self.consumer
    }

    pub async fn request_reload(&self, trigger: ReloadTrigger) -> Result<(), WatchError> {
        self.commands
            .send(WatchCommand::Reload(trigger))
            .await
            .map_err(|_| WatchError::ChannelClosed("watch commands"))
    }

    pub async fn next_event(&mut self) -> Option<WatchEvent> {
        self.events.recv().await
    }

    /// Unregister the OS watcher, stop the loop and wait for it.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        drop(self.watcher.take());
        let _ = self.shutdown.send(());
        match self.handle.await {
            Ok(inner) => inner,
            Err(err) => Err(WatchError::Join(err.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Interactive loop
// ---------------------------------------------------------------------------

/// Start the runtime and block the current thread until the user quits.
pub fn start_blocking<F>(config: &PipelineConfig, on_event: F) -> Result<(), WatchError>
where
    F: FnMut(&WatchEvent),
{
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config.clone(), on_event))
}

/// Initial load, then watch until `q` on stdin or Ctrl-C.
///
/// stdin reaching EOF does not stop the loop; only `q` or a signal does.
pub async fn run<F>(config: PipelineConfig, mut on_event: F) -> Result<(), WatchError>
where
    F: FnMut(&WatchEvent),
{
    let mut session = WatchSession::start(&config)?;
    session.request_reload(ReloadTrigger::Initial).await?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = session.next_event() => {
                let Some(event) = event else { break };
                on_event(&event);
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_key(&line) {
                    Some(KeyCommand::Reload) => {
                        tracing::info!("manual reload triggered");
                        session.request_reload(ReloadTrigger::Manual).await?;
                    }
                    Some(KeyCommand::Quit) => break,
                    None => {}
                },
                Ok(None) => stdin_open = false,
                Err(err) => {
                    tracing::warn!(error = %err, "stdin closed");
                    stdin_open = false;
                }
            },
            signal = &mut ctrl_c => {
                if let Err(err) = signal {
                    tracing::warn!(error = %err, "ctrl-c handler failed");
                }
                tracing::info!("received ctrl-c, shutting down watcher");
                break;
            }
        }
    }

    session.shutdown().await
}

pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_accepts_short_and_long_forms() {
        assert_eq!(parse_key("r"), Some(KeyCommand::Reload));
        assert_eq!(parse_key(" R \n"), Some(KeyCommand::Reload));
        assert_eq!(parse_key("reload"), Some(KeyCommand::Reload));
        assert_eq!(parse_key("Q"), Some(KeyCommand::Quit));
        assert_eq!(parse_key("quit"), Some(KeyCommand::Quit));
        assert_eq!(parse_key("x"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn relative_channel_path_watches_current_dir() {
        assert_eq!(
            channel_dir(Path::new("payroll_export.json")),
            std::path::PathBuf::from(".")
        );
        assert_eq!(
            channel_dir(Path::new("/srv/shared/payroll_export.json")),
            std::path::PathBuf::from("/srv/shared")
        );
    }

    #[test]
    fn only_create_and_modify_events_are_relevant() {
        use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
        assert!(is_relevant_event_kind(&EventKind::Create(CreateKind::File)));
        assert!(is_relevant_event_kind(&EventKind::Modify(ModifyKind::Any)));
        assert!(!is_relevant_event_kind(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_relevant_event_kind(&EventKind::Access(AccessKind::Any)));
    }
}
