//! Snapshot of a live game session.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Read-only view of the session owned by the supervisor.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SessionInfo {
    /// Unique session identifier.
    pub id: String,
    /// Catalog index of the running game.
    pub game_index: usize,
    /// Title of the running game.
    pub title: String,
    /// OS process id, when the platform still reports one.
    pub pid: Option<u32>,
    /// When the game process was started.
    pub started_at: DateTime<Utc>,
}
