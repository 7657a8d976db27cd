//! Hot-reload watcher for the games directory.
//!
//! [`CatalogWatcher`] uses the `notify` crate to watch the games directory
//! recursively. Any create, modify or remove event queues a raw request on a
//! bounded channel. A settle task waits out each burst (an asset sync
//! touches many files), drains it and forwards one request to the control
//! loop, which then calls [`reload`]. A failed reload keeps the previous
//! catalog; only the startup load is fatal.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::GameCatalog;
use crate::{AppError, Result};

/// Quiet period after the first event before a reload is attempted.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Keeps a file watcher on the games directory alive.
pub struct CatalogWatcher {
    games_dir: PathBuf,
    _watcher: RecommendedWatcher,
    settle_task: JoinHandle<()>,
}

impl Drop for CatalogWatcher {
    fn drop(&mut self) {
        self.settle_task.abort();
    }
}

impl CatalogWatcher {
    /// Start watching `games_dir` and return the watcher with its stream of
    /// settled reload requests. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Watch` if the platform watcher cannot be created or
    /// the directory cannot be watched.
    pub fn start(games_dir: &Path) -> Result<(Self, mpsc::Receiver<()>)> {
        let (tx, raw_rx) = mpsc::channel(1);

        let mut watcher = notify::recommended_watcher(
            move |result: std::result::Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if is_catalog_change(&event) {
                        // A full channel already holds a pending reload.
                        let _ = tx.try_send(());
                    }
                }
                Err(err) => {
                    warn!(%err, "catalog watcher error");
                }
            },
        )
        .map_err(|err| AppError::Watch(format!("failed to create watcher: {err}")))?;

        watcher
            .watch(games_dir, RecursiveMode::Recursive)
            .map_err(|err| {
                AppError::Watch(format!(
                    "failed to watch {}: {err}",
                    games_dir.display()
                ))
            })?;

        let (settled_tx, rx) = mpsc::channel(1);
        let settle_task = tokio::spawn(settle(raw_rx, settled_tx));

        info!(dir = %games_dir.display(), "watching games directory");

        Ok((
            Self {
                games_dir: games_dir.to_owned(),
                _watcher: watcher,
                settle_task,
            },
            rx,
        ))
    }

    /// Directory being watched.
    #[must_use]
    pub fn games_dir(&self) -> &Path {
        &self.games_dir
    }
}

/// Wait for the next settled reload request.
///
/// Cancel-safe: a request is never consumed unless this returns `true`.
/// Returns `false` once the watcher has been dropped.
pub async fn next_request(rx: &mut mpsc::Receiver<()>) -> bool {
    rx.recv().await.is_some()
}

/// Collapse each burst of raw events into one forwarded request.
async fn settle(mut raw: mpsc::Receiver<()>, settled: mpsc::Sender<()>) {
    while raw.recv().await.is_some() {
        tokio::time::sleep(SETTLE_DELAY).await;
        while raw.try_recv().is_ok() {}
        // A full channel already holds an unread request.
        if settled.try_send(()).is_err() && settled.is_closed() {
            break;
        }
        debug!("catalog reload requested");
    }
}

/// Reload the catalog, returning `None` (and logging why) if it is unusable.
#[must_use]
pub fn reload(games_dir: &Path) -> Option<GameCatalog> {
    match GameCatalog::load(games_dir) {
        Ok(catalog) if catalog.is_empty() => {
            warn!(dir = %games_dir.display(), "reloaded catalog is empty; keeping previous");
            None
        }
        Ok(catalog) => Some(catalog),
        Err(err) => {
            warn!(%err, "catalog reload failed; keeping previous");
            None
        }
    }
}

/// Whether a notify event can change the catalog.
fn is_catalog_change(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
