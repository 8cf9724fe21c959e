use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use textsnip_types::RecognitionMode;

use crate::env_parse;

fn default_language() -> String {
    "eng".to_string()
}

fn default_advanced_language() -> String {
    "english".to_string()
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    /// Backend used at startup
    pub mode: RecognitionMode,
    /// Tesseract language code
    #[serde(default = "default_language")]
    pub language: String,
    /// Extra Tesseract candidates, checked after PATH and the built-in locations
    pub tesseract_paths: Vec<PathBuf>,
    /// Directory holding the PaddleOCR detection/recognition models
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    /// Recognition model family for the advanced backend (e.g. "english", "chinese")
    #[serde(default = "default_advanced_language")]
    pub advanced_language: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            mode: RecognitionMode::default(),
            language: default_language(),
            tesseract_paths: Vec::new(),
            models_dir: default_models_dir(),
            advanced_language: default_advanced_language(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl OcrConfig {
    /// Time limit for one recognition. Zero is treated as one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    pub(crate) fn apply_env(&mut self) {
        if let Ok(mode) = env::var("OCR_MODE") {
            self.mode = RecognitionMode::parse(&mode);
        }
        if let Ok(language) = env::var("OCR_LANGUAGE") {
            self.language = language;
        }
        if let Some(paths) = env::var_os("TESSERACT_PATHS") {
            self.tesseract_paths.extend(env::split_paths(&paths));
        }
        if let Ok(dir) = env::var("OCR_MODELS_DIR") {
            self.models_dir = PathBuf::from(dir);
        }
        if let Ok(language) = env::var("OCR_ADVANCED_LANGUAGE") {
            self.advanced_language = language;
        }
        if let Some(timeout) = env_parse("OCR_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout;
        }
    }
}
