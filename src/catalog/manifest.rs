//! Per-game `game.toml` manifest.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{AppError, Result};

/// File name of the manifest inside each game directory.
pub const MANIFEST_FILE: &str = "game.toml";

/// Optional screenshot picked up next to the manifest.
pub const SCREENSHOT_FILE: &str = "ss.png";

/// Raw manifest contents. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Display title.
    pub title: String,
    /// Gallery description.
    pub description: String,
    /// Author credit.
    pub author: String,
    /// Executable base name, without the platform suffix.
    pub game_exe_name: String,
}

impl Manifest {
    /// Read and validate the manifest in `game_dir`.
    ///
    /// # Errors
    ///
    /// `AppError::MissingManifest` when `game.toml` is absent,
    /// `AppError::InvalidManifest` when it cannot be parsed or a required
    /// field is blank, `AppError::Io` for other read failures.
    pub fn read(game_dir: &Path) -> Result<Self> {
        let path = game_dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(AppError::MissingManifest(format!(
                "{MANIFEST_FILE} not found in {}",
                game_dir.display()
            )));
        }

        let raw = std::fs::read_to_string(&path)
            .map_err(|err| AppError::Io(format!("failed to read {}: {err}", path.display())))?;
        Self::parse(&raw, game_dir)
    }

    /// Parse manifest text; `game_dir` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidManifest` on malformed TOML, missing keys or
    /// blank values.
    pub fn parse(raw: &str, game_dir: &Path) -> Result<Self> {
        let manifest: Self = toml::from_str(raw).map_err(|err| {
            AppError::InvalidManifest(format!(
                "invalid {MANIFEST_FILE} in {}: {}",
                game_dir.display(),
                err.message()
            ))
        })?;

        for (field, value) in [
            ("title", &manifest.title),
            ("game_exe_name", &manifest.game_exe_name),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::InvalidManifest(format!(
                    "invalid {MANIFEST_FILE} in {}: `{field}` must not be empty",
                    game_dir.display()
                )));
            }
        }

        Ok(manifest)
    }

    /// Path of the executable this manifest declares, with the platform suffix.
    #[must_use]
    pub fn executable_in(&self, game_dir: &Path) -> PathBuf {
        game_dir.join(format!(
            "{}{}",
            self.game_exe_name,
            std::env::consts::EXE_SUFFIX
        ))
    }
}
