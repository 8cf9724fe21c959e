use std::time::Duration;

use kanal::AsyncSender;
use textsnip_config::hotkeys::HotkeyConfig;
use textsnip_ocr::{HotkeyListener, HotkeyManager};
use textsnip_types::{AppEvent, UiCommand};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Snip,
    ToggleMode,
}

/// Register the configured global hotkeys. Must run on the UI thread.
pub fn register_hotkeys(config: &HotkeyConfig) -> anyhow::Result<HotkeyManager<HotkeyAction>> {
    let manager = HotkeyManager::new(&[
        (config.snip.as_str(), HotkeyAction::Snip),
        (config.toggle_mode.as_str(), HotkeyAction::ToggleMode),
    ])?;
    tracing::info!(
        "Hotkeys registered (snip: {}, toggle mode: {})",
        config.snip,
        config.toggle_mode
    );
    Ok(manager)
}

/// Turn a hotkey press into a UI command or backend event.
pub fn forward_hotkey(
    action: HotkeyAction,
    ui_tx: &AsyncSender<UiCommand>,
    event_tx: &AsyncSender<AppEvent>,
) {
    let sent = match action {
        HotkeyAction::Snip => ui_tx.try_send(UiCommand::StartSnip),
        HotkeyAction::ToggleMode => event_tx.try_send(AppEvent::ToggleMode),
    };
    match sent {
        Ok(true) => {}
        Ok(false) => tracing::warn!("Queue full, dropping {:?} hotkey", action),
        Err(e) => tracing::error!("Failed to forward {:?} hotkey: {}", action, e),
    }
}

/// Poll hotkey presses on a blocking thread until cancelled.
pub async fn watcher_io(
    listener: HotkeyListener<HotkeyAction>,
    poll_interval: Duration,
    cancel: CancellationToken,
    ui_tx: AsyncSender<UiCommand>,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            if let Some(action) = listener.poll() {
                tracing::info!("{:?} hotkey pressed", action);
                forward_hotkey(action, &ui_tx, &event_tx);
            }
            std::thread::sleep(poll_interval);
        }
        tracing::info!("Hotkey listener stopping");
    })
    .await?;
    Ok(())
}

/// Cancel everything and close the UI on Ctrl+C.
pub async fn shutdown_on_ctrl_c(
    cancel: CancellationToken,
    ui_tx: AsyncSender<UiCommand>,
) -> anyhow::Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        result = tokio::signal::ctrl_c() => result?,
    }

    tracing::info!("Shutdown requested");
    cancel.cancel();
    if ui_tx.send(UiCommand::Quit).await.is_err() {
        tracing::debug!("UI already gone");
    }
    Ok(())
}
