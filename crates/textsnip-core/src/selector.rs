use textsnip_types::{Bitmap, SelectionRect};

use crate::error::SelectionError;
use crate::geometry::{LocalRect, OverlayGeometry};
use crate::selection::{Action, Discard, Effect, Phase, SelectionModel};

/// Full-screen selection surface driven by [`RegionSelector`].
///
/// Implementations only deal with windowing; every decision lives in the model.
pub trait Overlay {
    /// Show the overlay over the whole virtual screen.
    ///
    /// Returns the mapping from overlay-local units to screen pixels.
    fn open(&mut self) -> anyhow::Result<OverlayGeometry>;

    fn draw_selection(&mut self, rect: LocalRect);

    /// Tear the overlay down. Must be safe to call when it is not open.
    fn close(&mut self);
}

/// Grabs the pixels of an absolute screen rectangle.
pub trait ScreenGrabber {
    fn grab(&mut self, rect: SelectionRect) -> anyhow::Result<Bitmap>;
}

impl<F> ScreenGrabber for F
where
    F: FnMut(SelectionRect) -> anyhow::Result<Bitmap>,
{
    fn grab(&mut self, rect: SelectionRect) -> anyhow::Result<Bitmap> {
        self(rect)
    }
}

/// Pointer/keyboard input in overlay-local logical units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayInput {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    Cancel,
}

/// Final result of one session: the committed rectangle, or why nothing was captured.
pub type SnipOutcome = Result<SelectionRect, SelectionError>;

pub struct RegionSelector<O, G> {
    model: SelectionModel,
    overlay: O,
    grabber: G,
    geometry: OverlayGeometry,
    on_capture: Box<dyn FnMut(Bitmap)>,
}

impl<O: Overlay, G: ScreenGrabber> RegionSelector<O, G> {
    pub fn new(
        overlay: O,
        grabber: G,
        min_size: u32,
        on_capture: impl FnMut(Bitmap) + 'static,
    ) -> Self {
        Self {
            model: SelectionModel::new(min_size),
            overlay,
            grabber,
            geometry: OverlayGeometry::default(),
            on_capture: Box::new(on_capture),
        }
    }

    pub fn phase(&self) -> Phase {
        self.model.phase()
    }

    pub fn is_active(&self) -> bool {
        self.model.phase() == Phase::Selecting
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    /// Begin a session. Returns an outcome only if the overlay could not be opened.
    pub fn start_snip(&mut self) -> Option<SnipOutcome> {
        let effects = self.model.reduce(Action::Start);
        self.run(effects)
    }

    /// Feed one overlay event. Returns the outcome once the session ends.
    pub fn handle(&mut self, input: OverlayInput) -> Option<SnipOutcome> {
        let action = match input {
            OverlayInput::PointerDown { x, y } => Action::PointerDown(self.geometry.to_screen(x, y)),
            OverlayInput::PointerMove { x, y } => Action::PointerMove(self.geometry.to_screen(x, y)),
            OverlayInput::PointerUp { x, y } => Action::PointerUp(self.geometry.to_screen(x, y)),
            OverlayInput::Cancel => Action::Cancel,
        };
        let effects = self.model.reduce(action);
        self.run(effects)
    }

    fn run(&mut self, effects: Vec<Effect>) -> Option<SnipOutcome> {
        for effect in effects {
            match effect {
                Effect::OpenOverlay => match self.overlay.open() {
                    Ok(geometry) => {
                        tracing::debug!(
                            "Overlay open at ({}, {}) scale {}",
                            geometry.origin.x,
                            geometry.origin.y,
                            geometry.scale
                        );
                        self.geometry = geometry;
                    }
                    Err(e) => {
                        tracing::error!("Failed to open overlay: {:#}", e);
                        let _ = self.model.reduce(Action::Cancel);
                        self.overlay.close();
                        return Some(Err(SelectionError::OverlayUnavailable(e)));
                    }
                },
                Effect::DrawSelection(rect) => {
                    self.overlay.draw_selection(self.geometry.to_local(&rect));
                }
                Effect::CloseOverlay => self.overlay.close(),
                Effect::Capture(rect) => {
                    tracing::debug!(
                        "Capturing {}x{} at ({}, {})",
                        rect.width(),
                        rect.height(),
                        rect.x1(),
                        rect.y1()
                    );
                    return match self.grabber.grab(rect) {
                        Ok(bitmap) => {
                            (self.on_capture)(bitmap);
                            Some(Ok(rect))
                        }
                        Err(e) => {
                            tracing::warn!("Screen capture failed: {:#}", e);
                            Some(Err(SelectionError::CaptureFailed(e)))
                        }
                    };
                }
                Effect::Discard(Discard::Cancelled) => {
                    tracing::debug!("Selection cancelled");
                    return Some(Err(SelectionError::Cancelled));
                }
                Effect::Discard(Discard::Degenerate(rect)) => {
                    tracing::debug!("Discarding {}x{} selection", rect.width(), rect.height());
                    return Some(Err(SelectionError::Degenerate {
                        width: rect.width(),
                        height: rect.height(),
                    }));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use textsnip_types::ScreenPoint;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Open,
        Draw(LocalRect),
        Close,
        Grab(SelectionRect),
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    struct FakeOverlay {
        log: Log,
        geometry: OverlayGeometry,
        open: bool,
        opened: usize,
        fail_open: bool,
    }

    impl Overlay for FakeOverlay {
        fn open(&mut self) -> anyhow::Result<OverlayGeometry> {
            if self.fail_open {
                anyhow::bail!("no display");
            }
            self.log.borrow_mut().push(Call::Open);
            self.open = true;
            self.opened += 1;
            Ok(self.geometry)
        }

        fn draw_selection(&mut self, rect: LocalRect) {
            self.log.borrow_mut().push(Call::Draw(rect));
        }

        fn close(&mut self) {
            self.log.borrow_mut().push(Call::Close);
            self.open = false;
        }
    }

    type Captures = Rc<RefCell<Vec<Bitmap>>>;

    fn selector_with(
        geometry: OverlayGeometry,
        grab_fails: bool,
    ) -> (
        RegionSelector<FakeOverlay, impl FnMut(SelectionRect) -> anyhow::Result<Bitmap>>,
        Log,
        Captures,
    ) {
        let log: Log = Rc::default();
        let captures: Captures = Rc::default();

        let overlay = FakeOverlay {
            log: log.clone(),
            geometry,
            open: false,
            opened: 0,
            fail_open: false,
        };
        let grab_log = log.clone();
        let grabber = move |rect: SelectionRect| {
            grab_log.borrow_mut().push(Call::Grab(rect));
            if grab_fails {
                anyhow::bail!("display server went away");
            }
            let (w, h) = (rect.width(), rect.height());
            Ok(Bitmap::from_rgba(w, h, vec![255; (w * h * 4) as usize]).unwrap())
        };
        let sink = captures.clone();
        let selector = RegionSelector::new(overlay, grabber, 5, move |bitmap| {
            sink.borrow_mut().push(bitmap)
        });

        (selector, log, captures)
    }

    fn down(x: f32, y: f32) -> OverlayInput {
        OverlayInput::PointerDown { x, y }
    }

    fn moved(x: f32, y: f32) -> OverlayInput {
        OverlayInput::PointerMove { x, y }
    }

    fn up(x: f32, y: f32) -> OverlayInput {
        OverlayInput::PointerUp { x, y }
    }

    #[test]
    fn committed_drag_captures_after_overlay_is_gone() {
        let (mut selector, log, captures) = selector_with(OverlayGeometry::default(), false);

        assert!(selector.start_snip().is_none());
        assert!(selector.handle(down(100.0, 100.0)).is_none());
        assert!(selector.handle(moved(200.0, 70.0)).is_none());
        let outcome = selector.handle(up(300.0, 50.0)).unwrap().unwrap();

        let expected = SelectionRect::from_points(ScreenPoint::new(100, 50), ScreenPoint::new(300, 100));
        assert_eq!(outcome, expected);
        assert_eq!(
            (outcome.x1(), outcome.y1(), outcome.x2(), outcome.y2()),
            (100, 50, 300, 100)
        );

        let calls = log.borrow();
        let close = calls.iter().position(|c| *c == Call::Close).unwrap();
        let grab = calls.iter().position(|c| *c == Call::Grab(expected)).unwrap();
        assert!(close < grab, "overlay must be torn down before the grab");

        let captures = captures.borrow();
        assert_eq!(captures.len(), 1);
        assert_eq!((captures[0].width(), captures[0].height()), (200, 50));
        assert!(!selector.is_active());
        assert!(!selector.overlay().open);
    }

    #[test]
    fn local_coordinates_are_translated_to_screen() {
        let geometry = OverlayGeometry::new(ScreenPoint::new(-1920, 0), 2.0);
        let (mut selector, log, _) = selector_with(geometry, false);

        selector.start_snip();
        selector.handle(down(10.0, 10.0));
        selector.handle(moved(60.0, 35.0));
        let rect = selector.handle(up(60.0, 35.0)).unwrap().unwrap();

        assert_eq!((rect.x1(), rect.y1(), rect.x2(), rect.y2()), (-1900, 20, -1800, 70));

        // Overlay is redrawn in its own logical units.
        assert!(log.borrow().contains(&Call::Draw(LocalRect {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 25.0
        })));
    }

    #[test]
    fn degenerate_selection_never_calls_back() {
        let (mut selector, log, captures) = selector_with(OverlayGeometry::default(), false);

        selector.start_snip();
        selector.handle(down(10.0, 10.0));
        let outcome = selector.handle(up(15.0, 300.0)).unwrap();

        assert!(matches!(
            outcome,
            Err(SelectionError::Degenerate {
                width: 5,
                height: 290
            })
        ));
        assert!(captures.borrow().is_empty());
        assert!(!log.borrow().iter().any(|c| matches!(c, Call::Grab(_))));
        assert!(!selector.is_active());
        assert!(!selector.overlay().open);
    }

    #[test]
    fn second_start_keeps_single_overlay() {
        let (mut selector, _, _) = selector_with(OverlayGeometry::default(), false);

        selector.start_snip();
        selector.handle(down(0.0, 0.0));
        assert!(selector.start_snip().is_none());

        assert_eq!(selector.overlay().opened, 1);
        assert!(selector.is_active());
    }

    #[test]
    fn cancel_tears_down_without_callback() {
        let (mut selector, _, captures) = selector_with(OverlayGeometry::default(), false);

        selector.start_snip();
        selector.handle(down(0.0, 0.0));
        selector.handle(moved(400.0, 400.0));
        let outcome = selector.handle(OverlayInput::Cancel).unwrap();

        assert!(matches!(outcome, Err(SelectionError::Cancelled)));
        assert!(outcome.unwrap_err().is_silent());
        assert!(captures.borrow().is_empty());
        assert!(!selector.overlay().open);
        assert_eq!(selector.phase(), Phase::Idle);

        // A fresh session can start afterwards.
        selector.start_snip();
        assert_eq!(selector.overlay().opened, 2);
    }

    #[test]
    fn capture_failure_is_reported_not_swallowed() {
        let (mut selector, _, captures) = selector_with(OverlayGeometry::default(), true);

        selector.start_snip();
        selector.handle(down(0.0, 0.0));
        let outcome = selector.handle(up(100.0, 100.0)).unwrap();

        let err = outcome.unwrap_err();
        assert!(matches!(err, SelectionError::CaptureFailed(_)));
        assert!(!err.is_silent());
        assert!(err.to_string().contains("display server went away"));
        assert!(captures.borrow().is_empty());
        assert!(!selector.is_active());
    }

    #[test]
    fn overlay_failure_leaves_selector_idle() {
        let (mut selector, _, _) = selector_with(OverlayGeometry::default(), false);
        selector.overlay.fail_open = true;

        let outcome = selector.start_snip().unwrap();
        assert!(matches!(outcome, Err(SelectionError::OverlayUnavailable(_))));
        assert!(!selector.is_active());
    }
}
