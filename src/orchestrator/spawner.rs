//! Game process spawning and termination.
//!
//! Each launch gets its own child process started with no arguments and the
//! station's inherited environment, working in the game's own directory.
//! `kill_on_drop(true)` guarantees a dropped session never leaves a game
//! behind. Termination sends a graceful request first (SIGTERM on Unix,
//! `TerminateProcess` elsewhere) and escalates to a forced kill only when a
//! grace period is configured.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::process::{Child, Command};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::game::{absolute_path, Game};
use crate::models::session::SessionInfo;
use crate::{AppError, Result};

/// A running game: the selected entry, its child process and start time.
#[derive(Debug)]
pub struct Session {
    id: String,
    game: Game,
    child: Child,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Spawn the executable of `game`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Spawn` if the OS refuses to start the process.
    pub fn spawn(game: &Game) -> Result<Self> {
        let id = Uuid::new_v4().to_string();
        let span = info_span!("spawn_game", session_id = %id, title = %game.title);
        let _guard = span.enter();

        // A relative program path would be looked up after the chdir below.
        let program = absolute_path(&game.executable).map_err(|err| {
            AppError::Spawn(format!(
                "failed to resolve {}: {err}",
                game.executable.display()
            ))
        })?;

        let mut cmd = Command::new(&program);
        if let Some(dir) = program.parent() {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        let child = cmd.spawn().map_err(|err| {
            AppError::Spawn(format!(
                "failed to launch {}: {err}",
                game.executable.display()
            ))
        })?;

        info!(
            pid = child.id().unwrap_or(0),
            exe = %game.executable.display(),
            "game process spawned"
        );

        Ok(Self {
            id,
            game: game.clone(),
            child,
            started_at: Utc::now(),
        })
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Game this session runs.
    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// OS process id while the child has not been reaped.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Snapshot for callers outside the supervisor.
    #[must_use]
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            game_index: self.game.index,
            title: self.game.title.clone(),
            pid: self.pid(),
            started_at: self.started_at,
        }
    }

    /// Non-blocking liveness probe. An exited child is reaped by this call.
    pub fn poll_live(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                info!(
                    session_id = self.id,
                    status = %describe_exit(status),
                    "game process exited"
                );
                false
            }
            Err(err) => {
                warn!(session_id = self.id, %err, "failed to poll game process status");
                // Treat as exited so the slot is cleaned up.
                false
            }
        }
    }

    /// Ask the game to exit and wait until it has.
    ///
    /// With `force_after` set, a child still running after that grace period
    /// is killed outright. With `None` the wait is unbounded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Termination` if no signal could be delivered or the
    /// process could not be reaped.
    pub async fn terminate(self, force_after: Option<Duration>) -> Result<ExitStatus> {
        let span = info_span!("terminate_game", session_id = %self.id, title = %self.game.title);
        self.shut_down(force_after).instrument(span).await
    }

    async fn shut_down(mut self, force_after: Option<Duration>) -> Result<ExitStatus> {
        if let Ok(Some(status)) = self.child.try_wait() {
            info!(status = %describe_exit(status), "game process had already exited");
            return Ok(status);
        }

        request_exit(&mut self.child)?;

        let status = match force_after {
            None => self.child.wait().await.map_err(|err| {
                AppError::Termination(format!("failed to wait for game process: {err}"))
            })?,
            Some(grace) => match tokio::time::timeout(grace, self.child.wait()).await {
                Ok(result) => result.map_err(|err| {
                    AppError::Termination(format!("failed to wait for game process: {err}"))
                })?,
                Err(_) => {
                    warn!(
                        grace_secs = grace.as_secs(),
                        "game did not exit within grace period, forcing kill"
                    );
                    self.child.kill().await.map_err(|err| {
                        AppError::Termination(format!("failed to force-kill game process: {err}"))
                    })?;
                    self.child.wait().await.map_err(|err| {
                        AppError::Termination(format!("failed to reap game process: {err}"))
                    })?
                }
            },
        };

        info!(status = %describe_exit(status), "game process terminated");
        Ok(status)
    }
}

/// Deliver the platform's graceful termination request.
#[cfg(unix)]
fn request_exit(child: &mut Child) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = i32::try_from(pid)
        .map_err(|_| AppError::Termination(format!("pid {pid} out of range")))?;

    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(err) => Err(AppError::Termination(format!(
            "failed to send SIGTERM to {pid}: {err}"
        ))),
    }
}

/// Deliver the platform's graceful termination request.
#[cfg(not(unix))]
fn request_exit(child: &mut Child) -> Result<()> {
    child
        .start_kill()
        .map_err(|err| AppError::Termination(format!("failed to terminate game process: {err}")))
}

/// Human-readable exit status.
#[must_use]
pub fn describe_exit(status: ExitStatus) -> String {
    if status.success() {
        "exited normally (code 0)".to_owned()
    } else {
        status.code().map_or_else(
            || "terminated by signal".to_owned(),
            |code| format!("exited with code {code}"),
        )
    }
}
