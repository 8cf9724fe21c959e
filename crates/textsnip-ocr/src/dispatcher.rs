use std::sync::atomic::{AtomicBool, Ordering};

use textsnip_types::{Bitmap, RecognitionMode};

use crate::advanced::{EngineLoader, LazyEngine, Segment};
use crate::error::OcrFailure;
use crate::standard::StandardEngine;

/// Text recognized from one bitmap. Empty means no text was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub text: String,
}

impl Recognition {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub type RecognitionResult = Result<Recognition, OcrFailure>;

/// Routes bitmaps to the standard or advanced backend and normalizes what comes back.
///
/// Holds no UI state and never touches the bitmap's pixels, so it can be shared
/// behind an `Arc` and called from blocking worker threads.
pub struct RecognitionDispatcher {
    standard: Box<dyn StandardEngine>,
    standard_ready: AtomicBool,
    advanced: LazyEngine,
}

impl RecognitionDispatcher {
    pub fn new(standard: impl StandardEngine + 'static, advanced: impl EngineLoader + 'static) -> Self {
        Self {
            standard: Box::new(standard),
            standard_ready: AtomicBool::new(false),
            advanced: LazyEngine::new(advanced),
        }
    }

    /// Run discovery for the standard backend unless it already succeeded.
    pub fn ensure_standard_ready(&self) -> bool {
        if self.standard_ready.load(Ordering::Acquire) {
            return true;
        }
        let ready = self.standard.locate();
        if ready {
            self.standard_ready.store(true, Ordering::Release);
        }
        ready
    }

    pub fn advanced_loaded(&self) -> bool {
        self.advanced.is_loaded()
    }

    /// One recognition attempt, no retries.
    pub fn recognize(&self, bitmap: Bitmap, mode: RecognitionMode) -> RecognitionResult {
        tracing::debug!(
            "Recognizing {}x{} bitmap with {} backend",
            bitmap.width(),
            bitmap.height(),
            mode
        );
        match mode {
            RecognitionMode::Advanced => self.recognize_advanced(&bitmap),
            RecognitionMode::Standard => self.recognize_standard(&bitmap),
        }
    }

    fn recognize_standard(&self, bitmap: &Bitmap) -> RecognitionResult {
        if !self.ensure_standard_ready() {
            return Err(OcrFailure::BackendUnavailable);
        }

        let raw = self
            .standard
            .image_to_string(bitmap)
            .map_err(OcrFailure::engine)?;

        Ok(Recognition {
            text: raw.trim().to_string(),
        })
    }

    fn recognize_advanced(&self, bitmap: &Bitmap) -> RecognitionResult {
        let engine = self.advanced.get().map_err(OcrFailure::engine)?;
        let segments = engine.segments(bitmap).map_err(OcrFailure::engine)?;
        tracing::debug!("Advanced engine returned {} segments", segments.len());

        Ok(Recognition {
            text: join_segments(&segments),
        })
    }
}

/// Segment texts in engine order, one per line.
pub fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
