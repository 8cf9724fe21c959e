use std::sync::Arc;
use std::time::Duration;

use textsnip_ocr::{OcrFailure, RecognitionDispatcher, RecognitionResult};
use textsnip_types::{Bitmap, RecognitionMode};

use crate::sink::{Delivery, ResultSink};
use crate::state::AppState;

/// Run one recognition on the blocking pool, bounded by `limit`.
///
/// On timeout the blocking call keeps running in the background; its result is dropped.
pub async fn recognize(
    dispatcher: Arc<RecognitionDispatcher>,
    bitmap: Bitmap,
    mode: RecognitionMode,
    limit: Duration,
) -> RecognitionResult {
    let task = tokio::task::spawn_blocking(move || dispatcher.recognize(bitmap, mode));

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            tracing::error!(">>> [OCR] Task error: {}", e);
            Err(OcrFailure::EngineError(format!("recognition task failed: {e}")))
        }
        Err(_) => {
            tracing::warn!(">>> [OCR] Gave up after {:?}", limit);
            Err(OcrFailure::TimedOut(limit))
        }
    }
}

/// Recognize a captured bitmap with the mode it was dispatched under and deliver the result.
pub async fn handle_capture(
    state: Arc<AppState>,
    bitmap: Bitmap,
    mode: RecognitionMode,
    sink: Arc<ResultSink>,
) -> Delivery {
    let limit = state.ocr_timeout().await;
    state.status.record_capture().await;

    tracing::debug!(">>> [OCR] {}x{} with {} backend", bitmap.width(), bitmap.height(), mode);
    let start = std::time::Instant::now();
    let result = recognize(state.dispatcher.clone(), bitmap, mode, limit).await;

    let delivery = sink.deliver(&result);
    match &delivery {
        Delivery::Copied { preview } => tracing::debug!(
            ">>> [OCR] Copied {:?} in {:?}",
            preview,
            start.elapsed()
        ),
        Delivery::NothingFound => tracing::debug!(">>> [OCR] No text in {:?}", start.elapsed()),
        Delivery::Failed(reason) => tracing::error!(">>> [OCR] Failed: {}", reason),
    }
    state.status.record_delivery(&delivery).await;
    delivery
}
