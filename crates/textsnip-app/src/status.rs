use std::sync::Arc;

use tokio::sync::RwLock;

use crate::sink::Delivery;

/// OCR session counters
#[derive(Clone, Debug, Default)]
pub struct OcrStatus {
    pub capture_count: u64,
    pub copied_count: u64,
    pub empty_count: u64,
    pub error_count: u64,
}

/// Application status
pub struct AppStatus {
    pub ocr: Arc<RwLock<OcrStatus>>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            ocr: Arc::new(RwLock::new(OcrStatus::default())),
        }
    }

    pub async fn record_capture(&self) {
        self.ocr.write().await.capture_count += 1;
    }

    pub async fn record_capture_failure(&self) {
        self.ocr.write().await.error_count += 1;
    }

    pub async fn record_delivery(&self, delivery: &Delivery) {
        let mut ocr = self.ocr.write().await;
        match delivery {
            Delivery::Copied { .. } => ocr.copied_count += 1,
            Delivery::NothingFound => ocr.empty_count += 1,
            Delivery::Failed(_) => ocr.error_count += 1,
        }
    }

    pub async fn snapshot(&self) -> OcrStatus {
        self.ocr.read().await.clone()
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}
