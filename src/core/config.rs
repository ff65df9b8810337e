/// Game configuration loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::cache::CACHE_FILE_NAME;
use crate::core::library::LIBRARY_EXTENSION;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Where the game finds its libraries and cache.
///
/// ```ron
/// (
///     library_dir: "stories",
///     extension: "mlb",
///     cache_file: "strche.dat",
/// )
/// ```
///
/// Every field is optional. A relative `cache_file` is resolved against
/// `library_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub library_dir: PathBuf,
    pub extension: String,
    pub cache_file: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            library_dir: PathBuf::from("."),
            extension: LIBRARY_EXTENSION.to_string(),
            cache_file: PathBuf::from(CACHE_FILE_NAME),
        }
    }
}

impl GameConfig {
    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GameConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a configuration from a RON string.
    pub fn parse_ron(input: &str) -> Result<GameConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    /// Full path of the cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.library_dir.join(&self.cache_file)
    }
}
