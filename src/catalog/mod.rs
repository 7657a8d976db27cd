//! Game catalog discovery.
//!
//! Every immediate subdirectory of the games directory is one game. Each
//! must carry a `game.toml` manifest naming an executable that exists in
//! the same directory. Games are indexed in file-name order so the gallery
//! layout is stable across restarts and platforms.

pub mod manifest;
pub mod watcher;

use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span};

use crate::models::game::{absolute_path, Game};
use crate::{AppError, Result};

use self::manifest::{Manifest, SCREENSHOT_FILE};

/// Validated, ordered list of installed games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameCatalog {
    games: Vec<Game>,
}

impl GameCatalog {
    /// Build a catalog from already-validated games, reassigning indices.
    #[must_use]
    pub fn from_games(games: Vec<Game>) -> Self {
        let games = games
            .into_iter()
            .enumerate()
            .map(|(index, game)| Game { index, ..game })
            .collect();
        Self { games }
    }

    /// Load every game under `games_dir`.
    ///
    /// A relative `games_dir` is resolved against the current directory, so
    /// every executable path in the catalog is absolute.
    ///
    /// # Errors
    ///
    /// - `AppError::Io` if `games_dir` cannot be resolved or listed.
    /// - `AppError::MissingManifest` if a game directory has no `game.toml`.
    /// - `AppError::InvalidManifest` if a manifest is malformed.
    /// - `AppError::MissingExecutable` if the declared executable is absent.
    pub fn load(games_dir: &Path) -> Result<Self> {
        let _span = info_span!("catalog_load", dir = %games_dir.display()).entered();

        let games_dir = absolute_path(games_dir).map_err(|err| {
            AppError::Io(format!(
                "cannot resolve games directory {}: {err}",
                games_dir.display()
            ))
        })?;

        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&games_dir)
            .map_err(|err| {
                AppError::Io(format!(
                    "cannot read games directory {}: {err}",
                    games_dir.display()
                ))
            })?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let mut games = Vec::with_capacity(dirs.len());
        for (index, dir) in dirs.iter().enumerate() {
            games.push(load_game(dir, index)?);
        }

        info!(count = games.len(), "game catalog loaded");
        Ok(Self { games })
    }

    /// All games in index order.
    #[must_use]
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Game at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Game> {
        self.games.get(index)
    }

    /// Number of games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether the catalog has no games.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

fn load_game(dir: &Path, index: usize) -> Result<Game> {
    let manifest = Manifest::read(dir)?;

    let executable = manifest.executable_in(dir);
    if !executable.is_file() {
        return Err(AppError::MissingExecutable(format!(
            "{} not found in {}",
            executable
                .file_name()
                .map_or_else(String::new, |name| name.to_string_lossy().into_owned()),
            dir.display()
        )));
    }

    let screenshot = Some(dir.join(SCREENSHOT_FILE)).filter(|path| path.is_file());
    debug!(index, title = manifest.title, has_screenshot = screenshot.is_some(), "game found");

    Ok(Game {
        title: manifest.title,
        description: manifest.description,
        author: manifest.author,
        executable,
        screenshot,
        index,
    })
}
