//! Error types shared across the kiosk.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// File-system or I/O operation failure.
    Io(String),
    /// A game directory has no `game.toml`.
    MissingManifest(String),
    /// A `game.toml` is unparseable or lacks required fields.
    InvalidManifest(String),
    /// The executable declared by a manifest does not exist.
    MissingExecutable(String),
    /// The catalog contains no games.
    EmptyCatalog(String),
    /// A game session is already live on this station.
    AlreadyRunning(String),
    /// The game executable could not be started.
    Spawn(String),
    /// The game process could not be terminated.
    Termination(String),
    /// File watcher setup failure.
    Watch(String),
    /// Asset refresh step failure.
    Sync(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::MissingManifest(msg) => write!(f, "missing manifest: {msg}"),
            Self::InvalidManifest(msg) => write!(f, "invalid manifest: {msg}"),
            Self::MissingExecutable(msg) => write!(f, "missing executable: {msg}"),
            Self::EmptyCatalog(msg) => write!(f, "empty catalog: {msg}"),
            Self::AlreadyRunning(msg) => write!(f, "already running: {msg}"),
            Self::Spawn(msg) => write!(f, "spawn: {msg}"),
            Self::Termination(msg) => write!(f, "termination: {msg}"),
            Self::Watch(msg) => write!(f, "watch: {msg}"),
            Self::Sync(msg) => write!(f, "sync: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
