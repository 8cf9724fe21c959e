use std::time::Duration;

use thiserror::Error;

use crate::locate::INSTALL_HINT;

/// Why a recognition request produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrFailure {
    #[error("Tesseract-OCR is not installed or could not be found. Install it from {}", INSTALL_HINT)]
    BackendUnavailable,

    #[error("OCR engine error: {0}")]
    EngineError(String),

    #[error("OCR did not finish within {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl OcrFailure {
    pub(crate) fn engine(err: anyhow::Error) -> Self {
        OcrFailure::EngineError(format!("{err:#}"))
    }
}
