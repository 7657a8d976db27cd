//! Game catalog entry.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// One installed game, validated at catalog-load time and immutable afterwards.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Game {
    /// Display title.
    pub title: String,
    /// Short description shown in the gallery.
    pub description: String,
    /// Author credit.
    pub author: String,
    /// Resolved path to the game's executable.
    pub executable: PathBuf,
    /// Screenshot shown behind the description, if the game ships one.
    pub screenshot: Option<PathBuf>,
    /// Stable position in the catalog.
    pub index: usize,
}

impl Game {
    /// Directory the game was loaded from; used as the launch working directory.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.executable.parent()
    }
}

/// `path` unchanged if absolute, otherwise joined onto the current directory.
///
/// Symlinks are left alone.
///
/// # Errors
///
/// Returns the I/O error if the current directory cannot be determined.
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_owned())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
