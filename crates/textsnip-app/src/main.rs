use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use textsnip_config::Config;
use textsnip_types::{RecognitionMode, UiCommand};
use tracing_subscriber::EnvFilter;

mod controller;
mod events;
mod io;
mod sink;
mod state;
mod status;
mod ui;

#[cfg(test)]
mod tests;

use controller::AppController;
use sink::{LogNotifier, ResultSink, SystemClipboard};
use state::AppState;

/// textsnip - select a screen region and copy its text
#[derive(Parser, Debug)]
#[command(name = "textsnip")]
#[command(about = "Snip a screen region, recognize its text and copy it to the clipboard")]
struct Args {
    /// JSON config file (overrides TEXTSNIP_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start in this OCR mode: standard or advanced
    #[arg(short, long)]
    mode: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Do not register global hotkeys
    #[arg(long)]
    no_hotkeys: bool,

    /// Open the selection overlay right away
    #[arg(long)]
    snip: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(atty::is(atty::Stream::Stdout));
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.json_logs);

    let mut config = match &args.config {
        Some(path) => Config::load_from(Some(path.as_path()))?,
        None => Config::load()?,
    };
    if let Some(mode) = &args.mode {
        config.ocr.mode = RecognitionMode::parse(mode);
    }
    tracing::info!("Starting textsnip in {} mode", config.ocr.mode);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let sink = Arc::new(ResultSink::new(
        Arc::new(SystemClipboard::default()),
        Arc::new(LogNotifier),
        config.preview_chars,
    ));
    let ui_config = config.ui.clone();
    let hotkey_config = config.hotkeys.clone();
    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state.clone(), sink);

    // Hotkeys belong to the UI thread; only the listener leaves it
    let hotkeys = if args.no_hotkeys {
        None
    } else {
        match io::register_hotkeys(&hotkey_config) {
            Ok(manager) => Some(manager),
            Err(e) => {
                tracing::error!("Hotkeys unavailable: {:#}", e);
                None
            }
        }
    };

    let mut tasks = {
        let _guard = runtime.enter();
        controller.spawn_tasks(hotkeys.as_ref().map(|manager| manager.listener()))
    };

    if args.snip {
        let _ = controller.ui_commands().try_send(UiCommand::StartSnip);
    }

    if let Err(e) = ui::ui_loop(&ui_config, controller.ui_bridge()) {
        tracing::error!("UI loop exited with error: {:#}", e);
    }

    controller.shutdown();
    drop(hotkeys);
    runtime.block_on(async {
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            while let Some(result) = tasks.join_next().await {
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::error!("Task failed: {:#}", e),
                    Err(e) => tracing::error!("Task panicked: {}", e),
                }
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!("Some tasks did not stop in time");
        }

        let status = state.status.snapshot().await;
        tracing::info!(
            "Session: {} captures, {} copied, {} empty, {} errors",
            status.capture_count,
            status.copied_count,
            status.empty_count,
            status.error_count
        );
    });

    // A recognition stuck in the blocking pool must not hold the process open
    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}
