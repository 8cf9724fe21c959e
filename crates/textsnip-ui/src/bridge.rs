use kanal::{AsyncReceiver, AsyncSender};
use textsnip_types::{AppEvent, UiCommand};

/// Channels between the slint thread and the async backend.
///
/// Commands flow in (start a snip, quit), events flow out (captured bitmaps,
/// capture failures). Sending never blocks the UI thread.
#[derive(Clone)]
pub struct UiBridge {
    commands: AsyncReceiver<UiCommand>,
    events: AsyncSender<AppEvent>,
}

impl UiBridge {
    pub fn new(commands: AsyncReceiver<UiCommand>, events: AsyncSender<AppEvent>) -> Self {
        Self { commands, events }
    }

    pub(crate) async fn next_command(&self) -> Option<UiCommand> {
        self.commands.recv().await.ok()
    }

    /// Hand an event to the backend without waiting for room in the channel.
    pub(crate) fn emit(&self, event: AppEvent) {
        match self.events.try_send(event) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Backend event queue full, dropping event"),
            Err(e) => tracing::warn!("Backend is gone, dropping event: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use textsnip_types::Bitmap;

    use super::*;

    #[tokio::test]
    async fn emit_reaches_backend() {
        let (_cmd_tx, cmd_rx) = kanal::bounded_async::<UiCommand>(4);
        let (event_tx, event_rx) = kanal::bounded_async(4);
        let bridge = UiBridge::new(cmd_rx, event_tx);

        let bitmap = Bitmap::from_rgba(1, 1, vec![0; 4]).unwrap();
        bridge.emit(AppEvent::Captured(bitmap));

        match event_rx.recv().await.unwrap() {
            AppEvent::Captured(b) => assert_eq!((b.width(), b.height()), (1, 1)),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn emit_on_full_queue_does_not_block() {
        let (_cmd_tx, cmd_rx) = kanal::bounded_async::<UiCommand>(4);
        let (event_tx, event_rx) = kanal::bounded_async(1);
        let bridge = UiBridge::new(cmd_rx, event_tx);

        bridge.emit(AppEvent::ToggleMode);
        bridge.emit(AppEvent::CaptureFailed("dropped".to_string()));

        assert!(matches!(event_rx.recv().await.unwrap(), AppEvent::ToggleMode));
        assert_eq!(event_rx.len(), 0);
    }

    #[tokio::test]
    async fn closed_command_channel_ends_commands() {
        let (cmd_tx, cmd_rx) = kanal::bounded_async::<UiCommand>(4);
        let (event_tx, _event_rx) = kanal::bounded_async(4);
        let bridge = UiBridge::new(cmd_rx, event_tx);

        cmd_tx.send(UiCommand::StartSnip).await.unwrap();
        drop(cmd_tx);

        assert_eq!(bridge.next_command().await, Some(UiCommand::StartSnip));
        assert_eq!(bridge.next_command().await, None);
    }
}
