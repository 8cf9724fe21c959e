use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use image::{DynamicImage, RgbaImage};
use textsnip_types::Bitmap;

/// Bounding box of a segment, relative to the recognized bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One line of text found by a model-based engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub confidence: f32,
    pub bounds: SegmentBounds,
}

/// Model-based recognizer that returns line segments in reading order.
pub trait SegmentEngine: Send + Sync {
    fn segments(&self, bitmap: &Bitmap) -> Result<Vec<Segment>>;
}

/// Builds a [`SegmentEngine`]. Loading is expensive and happens at most once per [`LazyEngine`].
pub trait EngineLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn SegmentEngine>>;
}

/// Initialize-once holder for the advanced engine.
///
/// The first caller loads the engine while holding the lock, so concurrent
/// callers wait instead of loading a second copy. A failed load leaves the
/// cell empty and the next caller tries again.
pub struct LazyEngine {
    loader: Box<dyn EngineLoader>,
    engine: Mutex<Option<Arc<dyn SegmentEngine>>>,
}

impl LazyEngine {
    pub fn new(loader: impl EngineLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            engine: Mutex::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn SegmentEngine>> {
        let mut slot = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        tracing::info!("Loading advanced OCR engine...");
        let start = std::time::Instant::now();
        let engine = self.loader.load()?;
        tracing::info!("Advanced OCR engine ready in {:?}", start.elapsed());

        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }
}

/// Detection model shared by every language
const DET_MODEL: &str = "PP-OCRv5_mobile_det.mnn";

/// (language, recognition model, charset)
const REC_MODELS: &[(&str, &str, &str)] = &[
    ("chinese", "PP-OCRv5_mobile_rec.mnn", "ppocr_keys_v5.txt"),
    ("english", "en_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_en.txt"),
    ("latin", "latin_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_latin.txt"),
    ("korean", "korean_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_korean.txt"),
    ("cyrillic", "cyrillic_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_cyrillic.txt"),
];

/// Model file paths for a language: (detection, recognition, charset).
pub fn model_paths(models_dir: &Path, language: &str) -> Result<(PathBuf, PathBuf, PathBuf)> {
    let (_, rec, charset) = REC_MODELS
        .iter()
        .find(|(id, _, _)| *id == language)
        .with_context(|| format!("No recognition model known for language '{language}'"))?;

    let paths = (
        models_dir.join(DET_MODEL),
        models_dir.join(rec),
        models_dir.join(charset),
    );
    for path in [&paths.0, &paths.1, &paths.2] {
        anyhow::ensure!(path.exists(), "Model file missing: {}", path.display());
    }
    Ok(paths)
}

/// Loads PaddleOCR models through `ocr-rs`
pub struct PaddleLoader {
    models_dir: PathBuf,
    language: String,
}

impl PaddleLoader {
    pub fn new(models_dir: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            models_dir: models_dir.into(),
            language: language.into(),
        }
    }
}

impl EngineLoader for PaddleLoader {
    fn load(&self) -> Result<Arc<dyn SegmentEngine>> {
        let (det, rec, charset) = model_paths(&self.models_dir, &self.language)?;
        let engine = ocr_rs::OcrEngine::new(&det, &rec, &charset, None)
            .map_err(|e| anyhow::anyhow!("Failed to create OCR engine: {}", e))?;
        Ok(Arc::new(PaddleEngine {
            engine: Mutex::new(engine),
        }))
    }
}

struct PaddleEngine {
    engine: Mutex<ocr_rs::OcrEngine>,
}

impl SegmentEngine for PaddleEngine {
    fn segments(&self, bitmap: &Bitmap) -> Result<Vec<Segment>> {
        let pixels = RgbaImage::from_raw(bitmap.width(), bitmap.height(), bitmap.as_rgba().to_vec())
            .context("Bitmap does not match its dimensions")?;
        let image = DynamicImage::ImageRgba8(pixels);

        let engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        let raw = engine
            .recognize(&image)
            .map_err(|e| anyhow::anyhow!("OCR recognition failed: {}", e))?;

        Ok(raw
            .into_iter()
            .map(|r| Segment {
                text: r.text,
                confidence: r.confidence,
                bounds: SegmentBounds {
                    x: r.bbox.rect.left(),
                    y: r.bbox.rect.top(),
                    width: r.bbox.rect.width(),
                    height: r.bbox.rect.height(),
                },
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    struct Nothing;

    impl SegmentEngine for Nothing {
        fn segments(&self, _bitmap: &Bitmap) -> Result<Vec<Segment>> {
            Ok(Vec::new())
        }
    }

    struct SlowLoader {
        loads: Arc<AtomicUsize>,
        fail_first: bool,
    }

    impl EngineLoader for SlowLoader {
        fn load(&self) -> Result<Arc<dyn SegmentEngine>> {
            let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            if self.fail_first && attempt == 0 {
                anyhow::bail!("model file truncated");
            }
            Ok(Arc::new(Nothing))
        }
    }

    #[test]
    fn concurrent_first_use_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let lazy = Arc::new(LazyEngine::new(SlowLoader {
            loads: loads.clone(),
            fail_first: false,
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lazy = lazy.clone();
                std::thread::spawn(move || lazy.get().is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(lazy.is_loaded());
    }

    #[test]
    fn failed_load_is_retried() {
        let loads = Arc::new(AtomicUsize::new(0));
        let lazy = LazyEngine::new(SlowLoader {
            loads: loads.clone(),
            fail_first: true,
        });

        assert!(lazy.get().is_err());
        assert!(!lazy.is_loaded());
        assert!(lazy.get().is_ok());
        assert!(lazy.get().is_ok());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_models_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = model_paths(dir.path(), "english").unwrap_err();
        assert!(err.to_string().contains("Model file missing"));

        let err = model_paths(dir.path(), "klingon").unwrap_err();
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn model_paths_resolve_when_files_exist() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            DET_MODEL,
            "en_PP-OCRv5_mobile_rec_infer.mnn",
            "ppocr_keys_en.txt",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let (det, rec, charset) = model_paths(dir.path(), "english").unwrap();
        assert!(det.ends_with(DET_MODEL));
        assert!(rec.ends_with("en_PP-OCRv5_mobile_rec_infer.mnn"));
        assert!(charset.ends_with("ppocr_keys_en.txt"));
    }
}
