use std::sync::Arc;
use std::time::Duration;

use textsnip_config::Config;
use textsnip_ocr::{PaddleLoader, RecognitionDispatcher, TesseractEngine};
use textsnip_types::RecognitionMode;
use tokio::sync::RwLock;

use crate::status::AppStatus;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub mode: RwLock<RecognitionMode>,
    pub dispatcher: Arc<RecognitionDispatcher>,
    pub status: AppStatus,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let dispatcher = RecognitionDispatcher::new(
            TesseractEngine::new(config.ocr.language.clone(), config.ocr.tesseract_paths.clone()),
            PaddleLoader::new(config.ocr.models_dir.clone(), config.ocr.advanced_language.clone()),
        );
        Self::with_dispatcher(config, dispatcher)
    }

    pub fn with_dispatcher(config: Config, dispatcher: RecognitionDispatcher) -> Self {
        Self {
            mode: RwLock::new(config.ocr.mode),
            config: Arc::new(RwLock::new(config)),
            dispatcher: Arc::new(dispatcher),
            status: AppStatus::new(),
        }
    }

    pub async fn current_mode(&self) -> RecognitionMode {
        *self.mode.read().await
    }

    pub async fn ocr_timeout(&self) -> Duration {
        let config = self.config.read().await;
        config.ocr.timeout()
    }
}
