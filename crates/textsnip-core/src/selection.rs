use textsnip_types::{ScreenPoint, SelectionRect};

/// Default minimum selection side, in pixels. Sides at or below it are discarded.
pub const MIN_SELECTION_SIZE: u32 = 5;

/// Transient state of one selection interaction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CaptureSession {
    pub anchor: Option<ScreenPoint>,
    pub cursor: Option<ScreenPoint>,
    /// Last rectangle handed to the overlay, used to coalesce redraws
    drawn: Option<SelectionRect>,
}

/// High-level selection phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Selecting,
}

/// Input actions (pure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    PointerDown(ScreenPoint),
    PointerMove(ScreenPoint),
    PointerUp(ScreenPoint),
    Cancel,
}

/// Why a session ended without a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    Cancelled,
    Degenerate(SelectionRect),
}

/// Effects requested by the model, executed in order by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    OpenOverlay,
    DrawSelection(SelectionRect),
    CloseOverlay,
    Capture(SelectionRect),
    Discard(Discard),
}

/// Selection state machine model.
///
/// At most one session exists at a time; `Start` while one is active does nothing.
#[derive(Debug)]
pub struct SelectionModel {
    session: Option<CaptureSession>,
    min_size: u32,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new(MIN_SELECTION_SIZE)
    }
}

impl SelectionModel {
    pub fn new(min_size: u32) -> Self {
        Self {
            session: None,
            min_size,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.session {
            Some(_) => Phase::Selecting,
            None => Phase::Idle,
        }
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// In-progress rectangle, if the user has pressed and moved.
    pub fn current_selection(&self) -> Option<SelectionRect> {
        let session = self.session.as_ref()?;
        Some(SelectionRect::from_points(session.anchor?, session.cursor?))
    }

    pub fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Start => {
                if self.session.is_some() {
                    tracing::debug!("Selection already active, ignoring start");
                    return Vec::new();
                }
                self.session = Some(CaptureSession::default());
                vec![Effect::OpenOverlay]
            }

            Action::PointerDown(point) => {
                let Some(session) = self.session.as_mut() else {
                    return Vec::new();
                };
                if session.anchor.is_some() {
                    return Vec::new();
                }

                session.anchor = Some(point);
                session.cursor = Some(point);
                let rect = SelectionRect::from_points(point, point);
                session.drawn = Some(rect);
                vec![Effect::DrawSelection(rect)]
            }

            Action::PointerMove(point) => {
                let Some(session) = self.session.as_mut() else {
                    return Vec::new();
                };
                let Some(anchor) = session.anchor else {
                    return Vec::new();
                };

                session.cursor = Some(point);
                let rect = SelectionRect::from_points(anchor, point);
                if session.drawn == Some(rect) {
                    return Vec::new();
                }
                session.drawn = Some(rect);
                vec![Effect::DrawSelection(rect)]
            }

            Action::PointerUp(point) => {
                let Some(anchor) = self.session.as_ref().and_then(|s| s.anchor) else {
                    return Vec::new();
                };

                // Session ends here whatever the size turns out to be.
                self.session = None;
                let rect = SelectionRect::from_points(anchor, point);

                if rect.exceeds(self.min_size) {
                    vec![Effect::CloseOverlay, Effect::Capture(rect)]
                } else {
                    vec![
                        Effect::CloseOverlay,
                        Effect::Discard(Discard::Degenerate(rect)),
                    ]
                }
            }

            Action::Cancel => {
                if self.session.take().is_none() {
                    return Vec::new();
                }
                vec![Effect::CloseOverlay, Effect::Discard(Discard::Cancelled)]
            }
        }
    }
}
