use std::sync::Arc;

use textsnip_types::RecognitionMode;

use crate::sink::ResultSink;
use crate::state::AppState;

pub async fn handle_toggle_mode(state: &AppState, sink: &Arc<ResultSink>) -> RecognitionMode {
    let mode = {
        let mut mode = state.mode.write().await;
        *mode = mode.toggled();
        *mode
    };
    tracing::info!("Recognition mode: {}", mode);
    sink.mode_changed(mode);
    mode
}
