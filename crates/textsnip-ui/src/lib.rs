use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use slint::ComponentHandle;
use textsnip_config::ui::UiConfig;
use textsnip_core::RegionSelector;
use textsnip_types::{AppEvent, Bitmap, SelectionRect};

mod bridge;
mod events;
mod overlay;

pub use bridge::UiBridge;
pub use events::outcome_event;
pub use overlay::SlintOverlay;

slint::include_modules!();

/// Run the slint event loop on the calling thread until a `Quit` command arrives.
///
/// The overlay stays hidden between sessions; the loop keeps running with no
/// visible window.
pub fn ui_loop(config: &UiConfig, bridge: UiBridge) -> anyhow::Result<()> {
    let window = SnipOverlay::new()?;
    window.set_shade_alpha(config.clamped_alpha());

    let settle = Duration::from_millis(config.capture_settle_ms);
    let grabber = move |rect: SelectionRect| -> anyhow::Result<Bitmap> {
        // Give the compositor time to take the hidden overlay off screen
        std::thread::sleep(settle);
        textsnip_ocr::capture_screen_region(rect)
    };

    let on_capture = {
        let bridge = bridge.clone();
        move |bitmap: Bitmap| {
            tracing::info!("Captured {}x{} region", bitmap.width(), bitmap.height());
            bridge.emit(AppEvent::Captured(bitmap));
        }
    };

    let selector = Rc::new(RefCell::new(RegionSelector::new(
        SlintOverlay::new(window.clone_strong()),
        grabber,
        config.min_selection_size,
        on_capture,
    )));

    events::wire_callbacks(&window, &selector, &bridge);
    slint::spawn_local(events::command_loop(selector, bridge))?;

    tracing::info!("[UI] Ready");
    slint::run_event_loop_until_quit()?;
    Ok(())
}
