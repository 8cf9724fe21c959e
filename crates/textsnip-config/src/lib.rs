use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::hotkeys::HotkeyConfig;
use self::ocr::OcrConfig;
use self::ui::UiConfig;

pub mod hotkeys;
pub mod ocr;
pub mod ui;

/// Environment variable pointing at an optional JSON config file
pub const CONFIG_PATH_VAR: &str = "TEXTSNIP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub ui: UiConfig,
    pub hotkeys: HotkeyConfig,

    /// Characters shown in the result notification before truncating
    pub preview_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            ui: UiConfig::default(),
            hotkeys: HotkeyConfig::default(),
            preview_chars: 100,
        }
    }
}

impl Config {
    /// Defaults, then the file named by `TEXTSNIP_CONFIG` (if any), then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Defaults or the given file, then environment overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self) {
        self.ocr.apply_env();
        self.ui.apply_env();
        self.hotkeys.apply_env();

        if let Some(chars) = env_parse("PREVIEW_CHARS") {
            self.preview_chars = chars;
        }
    }
}

/// Reads and parses an environment variable, ignoring unset or malformed values.
pub(crate) fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring malformed {}={:?}", key, raw);
                None
            }
        },
        Err(_) => None,
    }
}
