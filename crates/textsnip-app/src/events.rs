use std::sync::Arc;

use kanal::AsyncReceiver;
use textsnip_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::sink::ResultSink;
use crate::state::AppState;

pub mod recognize;
pub mod toggle_mode;

use recognize::handle_capture;
use toggle_mode::handle_toggle_mode;

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    events_rx: AsyncReceiver<AppEvent>,
    sink: Arc<ResultSink>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Waiting for events");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => {
                    tracing::debug!("[EVENT_LOOP] Event channel closed");
                    break;
                }
            },
        };

        handle_events(state.clone(), &sink, event).await;
    }

    tracing::info!("[EVENT_LOOP] Stopped");
    Ok(())
}

async fn handle_events(state: Arc<AppState>, sink: &Arc<ResultSink>, event: AppEvent) {
    match event {
        AppEvent::Captured(bitmap) => {
            // Snapshot before spawning so a queued toggle cannot reach this capture
            let mode = state.current_mode().await;
            // Recognition is slow; keep the loop free for mode toggles
            tokio::spawn(handle_capture(state, bitmap, mode, sink.clone()));
        }
        AppEvent::CaptureFailed(message) => {
            state.status.record_capture_failure().await;
            sink.capture_failed(&message);
        }
        AppEvent::ToggleMode => {
            handle_toggle_mode(&state, sink).await;
        }
    }
}
