pub mod error;
pub mod geometry;
pub mod selection;
pub mod selector;

pub use error::SelectionError;
pub use geometry::{LocalRect, OverlayGeometry};
pub use selection::{MIN_SELECTION_SIZE, Phase};
pub use selector::{Overlay, OverlayInput, RegionSelector, ScreenGrabber, SnipOutcome};
