//! User-facing toggles, persisted as RON. The core only ever reads them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_DIR: &str = "villager-compass";
const CONFIG_FILE: &str = "config.ron";

/// Errors that can occur when reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] ron::de::SpannedError),
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] ron::Error),
}

/// Position and size of the minimap widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MinimapConfig {
    pub enabled: bool,
    /// Screen x of the top-left corner
    pub x: i32,
    /// Screen y of the top-left corner
    pub y: i32,
    /// Width in map units, scaled by the pixel zoom when drawn
    pub width: i32,
    /// Height in map units, scaled by the pixel zoom when drawn
    pub height: i32,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            x: 12,
            y: 12,
            width: 75,
            height: 45,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Only track characters sharing the player's outdoor root
    pub same_location_only: bool,
    /// Only track other players
    pub farmers_only: bool,
    /// Only track villagers with an open quest or a pending birthday gift
    pub quests_only: bool,
    pub show_horses: bool,
    /// Draw map markers hidden by the filters above, dimmed
    pub show_hidden: bool,
    /// Villager ids never shown on the map
    pub hidden_villagers: HashSet<String>,
    pub minimap: MinimapConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            same_location_only: false,
            farmers_only: false,
            quests_only: false,
            show_horses: true,
            show_hidden: false,
            hidden_villagers: HashSet::new(),
            minimap: MinimapConfig::default(),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::new().indentor("  ".to_string());
        let ron_string = ron::ser::to_string_pretty(self, pretty)?;
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(path, ron_string).map_err(io_error)
    }

    pub fn is_hidden_villager(&self, id: &str) -> bool {
        self.hidden_villagers.contains(id)
    }
}
