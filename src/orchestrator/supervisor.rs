//! Session supervisor: the single owner of "one game is running".
//!
//! The supervisor holds two slots, each behind its own async mutex:
//!
//! - the live [`Session`], if any;
//! - the active [`WatchdogHandle`], if any.
//!
//! The session lock is held for the whole of a termination so no second
//! game can be launched while the first is still shutting down. The
//! watchdog's kill callback only touches the session slot, never the
//! watchdog slot, so cancelling and joining a watchdog can never wait on
//! itself.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::Mutex;
use tracing::{error, info, info_span, Instrument};

use crate::models::game::Game;
use crate::models::session::SessionInfo;
use crate::orchestrator::spawner::Session;
use crate::orchestrator::watchdog::{Alerter, KillCallback, Thresholds, Watchdog, WatchdogHandle};
use crate::{AppError, Result};

/// Invoked after a forced reclaim; the front-end closes its window here.
pub type ReclaimHook = Arc<dyn Fn() + Send + Sync>;

/// Supervisor tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// Watchdog thresholds for every session.
    pub thresholds: Thresholds,
    /// Grace period before a forced kill; `None` waits indefinitely.
    pub force_kill_after: Option<Duration>,
    /// Replace a running watchdog with a fresh one on every launch.
    pub reset_watchdog_on_launch: bool,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            force_kill_after: Some(Duration::from_secs(5)),
            reset_watchdog_on_launch: true,
        }
    }
}

/// Owns the live game process and its watchdog.
pub struct SessionSupervisor {
    settings: SupervisorSettings,
    alerter: Arc<dyn Alerter>,
    on_reclaim: ReclaimHook,
    session: Arc<Mutex<Option<Session>>>,
    watchdog: Mutex<Option<WatchdogHandle>>,
}

impl SessionSupervisor {
    /// Create an idle supervisor.
    #[must_use]
    pub fn new(
        settings: SupervisorSettings,
        alerter: Arc<dyn Alerter>,
        on_reclaim: ReclaimHook,
    ) -> Self {
        Self {
            settings,
            alerter,
            on_reclaim,
            session: Arc::new(Mutex::new(None)),
            watchdog: Mutex::new(None),
        }
    }

    /// Supervisor settings.
    #[must_use]
    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    /// Launch `game` and arm a watchdog for it.
    ///
    /// # Errors
    ///
    /// - `AppError::AlreadyRunning` if a game process is still live; the
    ///   running session is left untouched.
    /// - `AppError::Spawn` if the executable could not be started.
    pub async fn start(&self, game: &Game) -> Result<SessionInfo> {
        let span = info_span!("start_session", index = game.index, title = %game.title);
        self.launch(game).instrument(span).await
    }

    /// Terminate the live game, if any, and wait for it to exit.
    ///
    /// Calling this with no live game is a no-op. The watchdog is left
    /// alone; see [`end_session`](Self::end_session).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Termination` if the process could not be stopped.
    pub async fn stop(&self) -> Result<()> {
        let mut slot = self.session.lock().await;
        let Some(session) = slot.take() else {
            return Ok(());
        };
        session
            .terminate(self.settings.force_kill_after)
            .await
            .map(|_| ())
    }

    /// Whether a game process is live. Reaps the handle of an exited game.
    pub async fn is_running(&self) -> bool {
        let mut slot = self.session.lock().await;
        let live = slot.as_mut().is_some_and(Session::poll_live);
        if !live && slot.take().is_some() {
            info!("session ended on its own");
        }
        live
    }

    /// Snapshot of the live session.
    pub async fn current(&self) -> Option<SessionInfo> {
        let mut slot = self.session.lock().await;
        let live = slot.as_mut().is_some_and(Session::poll_live);
        match slot.as_ref() {
            Some(session) if live => Some(session.info()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Start a watchdog unless one is already counting down.
    pub async fn ensure_watchdog(&self) {
        let mut slot = self.watchdog.lock().await;
        if slot.as_ref().is_some_and(WatchdogHandle::is_active) {
            return;
        }
        if let Some(stale) = slot.take() {
            stale.shutdown().await;
        }
        *slot = Some(self.arm("station".to_owned()));
    }

    /// Whether a watchdog is currently counting down.
    pub async fn watchdog_active(&self) -> bool {
        self.watchdog
            .lock()
            .await
            .as_ref()
            .is_some_and(WatchdogHandle::is_active)
    }

    /// Cancel the active watchdog and wait for it; the next one starts fresh.
    pub async fn cancel_watchdog(&self) {
        let handle = self.watchdog.lock().await.take();
        if let Some(handle) = handle {
            let phase = handle.shutdown().await;
            info!(?phase, "watchdog cancelled");
        }
    }

    /// Cancel the watchdog, then stop the live game.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Termination` if the process could not be stopped.
    pub async fn end_session(&self) -> Result<()> {
        self.cancel_watchdog().await;
        self.stop().await
    }

    async fn launch(&self, game: &Game) -> Result<SessionInfo> {
        let info = {
            let mut slot = self.session.lock().await;
            if let Some(existing) = slot.as_mut() {
                if existing.poll_live() {
                    info!(running = %existing.game().title, "launch rejected, a game is already running");
                    return Err(AppError::AlreadyRunning(existing.game().title.clone()));
                }
                *slot = None;
            }

            let session = Session::spawn(game)?;
            let info = session.info();
            *slot = Some(session);
            info
        };

        if self.settings.reset_watchdog_on_launch {
            self.restart_watchdog(&info.id).await;
        } else {
            self.ensure_watchdog().await;
        }

        info!(session_id = %info.id, pid = info.pid.unwrap_or(0), "session started");
        Ok(info)
    }

    async fn restart_watchdog(&self, label: &str) {
        let mut slot = self.watchdog.lock().await;
        if let Some(previous) = slot.take() {
            previous.shutdown().await;
        }
        *slot = Some(self.arm(label.to_owned()));
    }

    fn arm(&self, label: String) -> WatchdogHandle {
        Watchdog::new(
            label,
            self.settings.thresholds,
            Arc::clone(&self.alerter),
            self.reclaim_callback(),
        )
        .spawn()
    }

    /// Kill path: terminate the live game under the session lock, then
    /// hand the station back through the reclaim hook.
    fn reclaim_callback(&self) -> KillCallback {
        let session = Arc::clone(&self.session);
        let hook = Arc::clone(&self.on_reclaim);
        let force_after = self.settings.force_kill_after;

        Box::new(move || {
            async move {
                let mut slot = session.lock().await;
                if let Some(live) = slot.take() {
                    let title = live.game().title.clone();
                    if let Err(err) = live.terminate(force_after).await {
                        error!(%err, title, "failed to reclaim station from game");
                    }
                }
                drop(slot);
                hook();
            }
            .boxed()
        })
    }
}
