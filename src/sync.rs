//! Best-effort refresh of the game assets from a git remote.
//!
//! The station keeps a checkout of the asset repository. At startup the
//! kiosk clones it (first boot) or fetches and hard-resets it to the remote
//! branch. Every step runs `git` as a child process under a timeout; a
//! timed-out process is killed. Nothing here is fatal: the kiosk starts
//! with whatever is on disk.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, info_span, warn, Instrument};

use crate::config::SyncConfig;
use crate::{AppError, Result};

/// Result of a sync attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The checkout now matches the remote branch.
    Updated,
    /// Sync is disabled.
    Skipped,
    /// `git` did not finish in time.
    TimedOut,
    /// `git` failed or could not be started.
    Failed(String),
}

/// Refreshes an asset checkout from its remote.
#[derive(Debug, Clone)]
pub struct AssetSync {
    enabled: bool,
    remote_url: String,
    branch: String,
    checkout: PathBuf,
    initial_timeout: Duration,
    refresh_timeout: Duration,
}

impl AssetSync {
    /// Build from configuration for the checkout at `checkout`.
    #[must_use]
    pub fn new(config: &SyncConfig, checkout: &Path) -> Self {
        Self {
            enabled: config.enabled,
            remote_url: config.remote_url.clone(),
            branch: config.branch.clone(),
            checkout: checkout.to_owned(),
            initial_timeout: Duration::from_secs(config.initial_timeout_seconds),
            refresh_timeout: Duration::from_secs(config.refresh_timeout_seconds),
        }
    }

    /// Whether a checkout already exists on disk.
    #[must_use]
    pub fn has_checkout(&self) -> bool {
        self.checkout.join(".git").exists()
    }

    /// Time budget for the next [`run`](Self::run).
    #[must_use]
    pub fn budget(&self) -> Duration {
        if self.has_checkout() {
            self.refresh_timeout
        } else {
            self.initial_timeout
        }
    }

    /// Clone or refresh the checkout within the time budget.
    pub async fn run(&self) -> SyncOutcome {
        if !self.enabled {
            info!("asset sync disabled");
            return SyncOutcome::Skipped;
        }

        let span = info_span!("asset_sync", remote = %self.remote_url, dir = %self.checkout.display());
        let budget = self.budget();
        let outcome = match tokio::time::timeout(budget, self.steps().instrument(span)).await {
            Ok(Ok(())) => SyncOutcome::Updated,
            Ok(Err(err)) => SyncOutcome::Failed(err.to_string()),
            Err(_) => SyncOutcome::TimedOut,
        };

        match &outcome {
            SyncOutcome::Updated => info!("asset sync done"),
            SyncOutcome::TimedOut => {
                warn!(budget_secs = budget.as_secs(), "asset sync timed out");
            }
            SyncOutcome::Failed(reason) => warn!(%reason, "asset sync failed"),
            SyncOutcome::Skipped => {}
        }
        outcome
    }

    async fn steps(&self) -> Result<()> {
        if self.has_checkout() {
            let remote_ref = format!("origin/{}", self.branch);
            git(&self.checkout, &["fetch", "origin", &self.branch]).await?;
            git(&self.checkout, &["reset", "--hard", &remote_ref]).await
        } else {
            let target = self.checkout.to_string_lossy().into_owned();
            git(
                Path::new("."),
                &[
                    "clone",
                    "--depth",
                    "1",
                    "--branch",
                    &self.branch,
                    &self.remote_url,
                    &target,
                ],
            )
            .await
        }
    }
}

/// Run one `git` command in `dir`. Dropping the future kills the process.
async fn git(dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|err| AppError::Sync(format!("failed to run git: {err}")))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(AppError::Sync(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            stderr.trim()
        )))
    }
}
