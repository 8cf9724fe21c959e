use std::cell::RefCell;
use std::rc::{Rc, Weak};

use textsnip_core::{OverlayInput, RegionSelector, ScreenGrabber, SnipOutcome};
use textsnip_types::{AppEvent, UiCommand};

use crate::SnipOverlay;
use crate::bridge::UiBridge;
use crate::overlay::SlintOverlay;

pub(crate) type SharedSelector<G> = Rc<RefCell<RegionSelector<SlintOverlay, G>>>;

/// Backend event for a finished session, if the user needs to hear about it.
///
/// Successful captures already went out through the capture callback, and
/// cancelled or too-small selections end silently.
pub fn outcome_event(outcome: SnipOutcome) -> Option<AppEvent> {
    match outcome {
        Ok(rect) => {
            tracing::debug!("Snip committed {}x{}", rect.width(), rect.height());
            None
        }
        Err(e) if e.is_silent() => {
            tracing::debug!("Snip ended: {}", e);
            None
        }
        Err(e) => {
            tracing::error!("Snip failed: {}", e);
            Some(AppEvent::CaptureFailed(e.to_string()))
        }
    }
}

fn report(bridge: &UiBridge, outcome: Option<SnipOutcome>) {
    if let Some(event) = outcome.and_then(outcome_event) {
        bridge.emit(event);
    }
}

fn dispatch<G: ScreenGrabber>(selector: &Weak<RefCell<RegionSelector<SlintOverlay, G>>>, bridge: &UiBridge, input: OverlayInput) {
    let Some(selector) = selector.upgrade() else {
        return;
    };
    let outcome = match selector.try_borrow_mut() {
        Ok(mut selector) => selector.handle(input),
        Err(_) => {
            tracing::warn!("Selector busy, dropping {:?}", input);
            return;
        }
    };
    report(bridge, outcome);
}

/// Route overlay input callbacks into the selector.
pub(crate) fn wire_callbacks<G: ScreenGrabber + 'static>(
    window: &SnipOverlay,
    selector: &SharedSelector<G>,
    bridge: &UiBridge,
) {
    {
        let selector = Rc::downgrade(selector);
        let bridge = bridge.clone();
        window.on_pointer_down(move |x, y| {
            dispatch(&selector, &bridge, OverlayInput::PointerDown { x, y });
        });
    }
    {
        let selector = Rc::downgrade(selector);
        let bridge = bridge.clone();
        window.on_pointer_move(move |x, y| {
            dispatch(&selector, &bridge, OverlayInput::PointerMove { x, y });
        });
    }
    {
        let selector = Rc::downgrade(selector);
        let bridge = bridge.clone();
        window.on_pointer_up(move |x, y| {
            dispatch(&selector, &bridge, OverlayInput::PointerUp { x, y });
        });
    }
    {
        let selector = Rc::downgrade(selector);
        let bridge = bridge.clone();
        window.on_cancel(move || {
            dispatch(&selector, &bridge, OverlayInput::Cancel);
        });
    }
}

/// Drain UI commands until `Quit` or until every sender is gone.
pub(crate) async fn command_loop<G: ScreenGrabber + 'static>(selector: SharedSelector<G>, bridge: UiBridge) {
    while let Some(command) = bridge.next_command().await {
        tracing::debug!("[UI] Command: {:?}", command);
        match command {
            UiCommand::StartSnip => {
                let outcome = match selector.try_borrow_mut() {
                    Ok(mut selector) => selector.start_snip(),
                    Err(_) => {
                        tracing::warn!("Selector busy, ignoring snip request");
                        continue;
                    }
                };
                report(&bridge, outcome);
            }
            UiCommand::Quit => break,
        }
    }

    if let Ok(mut selector) = selector.try_borrow_mut() {
        if selector.is_active() {
            selector.handle(OverlayInput::Cancel);
        }
    }
    tracing::info!("[UI] Leaving event loop");
    if let Err(e) = slint::quit_event_loop() {
        tracing::warn!("Failed to quit event loop: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use textsnip_core::SelectionError;
    use textsnip_types::{ScreenPoint, SelectionRect};

    use super::*;

    #[test]
    fn committed_selection_needs_no_event() {
        let rect = SelectionRect::from_points(ScreenPoint::new(100, 100), ScreenPoint::new(300, 50));
        assert!(outcome_event(Ok(rect)).is_none());
    }

    #[test]
    fn silent_endings_need_no_event() {
        assert!(outcome_event(Err(SelectionError::Cancelled)).is_none());
        assert!(
            outcome_event(Err(SelectionError::Degenerate {
                width: 3,
                height: 200
            }))
            .is_none()
        );
    }

    #[test]
    fn capture_failure_becomes_notification_event() {
        let err = SelectionError::CaptureFailed(anyhow::anyhow!("no monitor covers selection"));
        match outcome_event(Err(err)) {
            Some(AppEvent::CaptureFailed(message)) => {
                assert!(message.contains("no monitor covers selection"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn overlay_failure_is_reported_too() {
        let err = SelectionError::OverlayUnavailable(anyhow::anyhow!("no display"));
        assert!(matches!(
            outcome_event(Err(err)),
            Some(AppEvent::CaptureFailed(_))
        ));
    }
}
