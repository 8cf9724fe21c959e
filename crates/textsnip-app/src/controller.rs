use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use textsnip_ocr::{HotkeyListener, INSTALL_HINT};
use textsnip_types::{AppEvent, UiCommand};
use textsnip_ui::UiBridge;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::{HotkeyAction, shutdown_on_ctrl_c, watcher_io};
use crate::sink::ResultSink;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub ui_commands: (AsyncSender<UiCommand>, AsyncReceiver<UiCommand>),
    pub app_events: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            ui_commands: kanal::bounded_async(16),
            app_events: kanal::bounded_async(64),
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    sink: Arc<ResultSink>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>, sink: Arc<ResultSink>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            sink,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Channel ends for the UI thread
    pub fn ui_bridge(&self) -> UiBridge {
        UiBridge::new(
            self.channels.ui_commands.1.clone(),
            self.channels.app_events.0.clone(),
        )
    }

    pub fn ui_commands(&self) -> AsyncSender<UiCommand> {
        self.channels.ui_commands.0.clone()
    }

    /// Spawn the backend tasks. Must be called inside the runtime.
    pub fn spawn_tasks(
        &self,
        hotkeys: Option<HotkeyListener<HotkeyAction>>,
    ) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.app_events.1.clone(),
            self.sink.clone(),
            self.cancel_token.child_token(),
        ));

        // Hotkey watcher
        if let Some(listener) = hotkeys {
            tasks.spawn(watcher_io(
                listener,
                Duration::from_millis(50),
                self.cancel_token.child_token(),
                self.channels.ui_commands.0.clone(),
                self.channels.app_events.0.clone(),
            ));
        }

        // Ctrl+C
        tasks.spawn(shutdown_on_ctrl_c(
            self.cancel_token.clone(),
            self.channels.ui_commands.0.clone(),
        ));

        // Standard backend discovery, so a missing install shows up before the first snip
        let dispatcher = self.state.dispatcher.clone();
        tasks.spawn(async move {
            let ready = tokio::task::spawn_blocking(move || dispatcher.ensure_standard_ready()).await?;
            if !ready {
                tracing::warn!(
                    "Tesseract not found. Standard OCR will fail until it is installed: {}",
                    INSTALL_HINT
                );
            }
            Ok(())
        });

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
