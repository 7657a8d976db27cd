//! Kiosk configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Exclusive upper bound on the watchdog poll interval; cancellation must be
/// observed within a second.
pub const MAX_POLL_INTERVAL_MS: u64 = 1000;

/// Session time limits enforced by the watchdog.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct WatchdogConfig {
    /// Seconds into a session before the "please make room" warning.
    #[serde(default = "default_warning_seconds")]
    pub warning_seconds: u64,
    /// Seconds into a session before the station is forcibly reclaimed.
    #[serde(default = "default_kill_seconds")]
    pub kill_seconds: u64,
    /// How often the watchdog checks its thresholds and cancellation.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Start a fresh watchdog on every launch, even if one is already running.
    #[serde(default = "default_true")]
    pub reset_on_launch: bool,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            warning_seconds: default_warning_seconds(),
            kill_seconds: default_kill_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
            reset_on_launch: true,
        }
    }
}

/// How game processes are shut down.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Seconds to wait after the graceful request before forcing a kill.
    /// `0` waits for the process indefinitely.
    #[serde(default = "default_force_kill_after")]
    pub force_kill_after_seconds: u64,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            force_kill_after_seconds: default_force_kill_after(),
        }
    }
}

/// Remote asset refresh settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SyncConfig {
    /// Whether to refresh the assets directory at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Git remote holding the game assets.
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    /// Branch checked out into the assets directory.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Timeout for the first clone into an empty station.
    #[serde(default = "default_initial_timeout")]
    pub initial_timeout_seconds: u64,
    /// Timeout for refreshing an existing checkout.
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            remote_url: default_remote_url(),
            branch: default_branch(),
            initial_timeout_seconds: default_initial_timeout(),
            refresh_timeout_seconds: default_refresh_timeout(),
        }
    }
}

/// Texts shown to attendees.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct MessagesConfig {
    /// Kiosk title on the main menu.
    #[serde(default = "default_title")]
    pub title: String,
    /// Modal shown when the warning threshold passes.
    #[serde(default = "default_warning_message")]
    pub warning: String,
    /// Modal shown right before the station is reclaimed.
    #[serde(default = "default_expired_message")]
    pub expired: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            warning: default_warning_message(),
            expired: default_expired_message(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_warning_seconds() -> u64 {
    300
}

fn default_kill_seconds() -> u64 {
    600
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_force_kill_after() -> u64 {
    5
}

fn default_remote_url() -> String {
    "https://github.com/nahco314/agc77-minigames".into()
}

fn default_branch() -> String {
    "main".into()
}

fn default_initial_timeout() -> u64 {
    60
}

fn default_refresh_timeout() -> u64 {
    5
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_games_dir() -> PathBuf {
    PathBuf::from("assets/games")
}

fn default_title() -> String {
    "Minigame Collection".into()
}

fn default_warning_message() -> String {
    "Time is almost up! Please make room for the next visitor.".into()
}

fn default_expired_message() -> String {
    "You have played for too long, so the game will now close. \
     Please leave the exhibit once and come back again."
        .into()
}

/// Station configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct KioskConfig {
    /// Checkout directory kept in sync with the asset remote.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Directory holding one subdirectory per game.
    #[serde(default = "default_games_dir")]
    pub games_dir: PathBuf,
    /// Reload the catalog when the games directory changes.
    #[serde(default = "default_true")]
    pub watch_catalog: bool,
    /// Session time limits.
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    /// Process shutdown behavior.
    #[serde(default)]
    pub termination: TerminationConfig,
    /// Remote asset refresh.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Attendee-facing texts.
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            games_dir: default_games_dir(),
            watch_catalog: true,
            watchdog: WatchdogConfig::default(),
            termination: TerminationConfig::default(),
            sync: SyncConfig::default(),
            messages: MessagesConfig::default(),
        }
    }
}

impl KioskConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Warning threshold as a [`Duration`].
    #[must_use]
    pub fn warning_after(&self) -> Duration {
        Duration::from_secs(self.watchdog.warning_seconds)
    }

    /// Kill threshold as a [`Duration`].
    #[must_use]
    pub fn kill_after(&self) -> Duration {
        Duration::from_secs(self.watchdog.kill_seconds)
    }

    /// Watchdog poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog.poll_interval_ms)
    }

    /// Grace period before a forced kill; `None` means wait indefinitely.
    #[must_use]
    pub fn force_kill_after(&self) -> Option<Duration> {
        match self.termination.force_kill_after_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.watchdog.warning_seconds == 0 {
            return Err(AppError::Config(
                "watchdog.warning_seconds must be greater than zero".into(),
            ));
        }

        if self.watchdog.kill_seconds <= self.watchdog.warning_seconds {
            return Err(AppError::Config(format!(
                "watchdog.kill_seconds ({}) must exceed watchdog.warning_seconds ({})",
                self.watchdog.kill_seconds, self.watchdog.warning_seconds
            )));
        }

        if self.watchdog.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "watchdog.poll_interval_ms must be greater than zero".into(),
            ));
        }

        if self.watchdog.poll_interval_ms >= MAX_POLL_INTERVAL_MS {
            return Err(AppError::Config(format!(
                "watchdog.poll_interval_ms ({}) must be below {MAX_POLL_INTERVAL_MS}",
                self.watchdog.poll_interval_ms
            )));
        }

        if self.sync.enabled && self.sync.remote_url.trim().is_empty() {
            return Err(AppError::Config(
                "sync.remote_url must not be empty when sync is enabled".into(),
            ));
        }

        Ok(())
    }
}
