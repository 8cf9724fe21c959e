mod advanced;
mod capture;
mod dispatcher;
mod error;
mod hotkey;
mod locate;
mod standard;

pub use advanced::{
    EngineLoader, LazyEngine, PaddleLoader, Segment, SegmentBounds, SegmentEngine, model_paths,
};
pub use capture::{capture_screen_region, virtual_screen};
pub use dispatcher::{Recognition, RecognitionDispatcher, RecognitionResult, join_segments};
pub use error::OcrFailure;
pub use hotkey::{HotkeyListener, HotkeyManager};
pub use locate::{INSTALL_HINT, default_candidates, locate_tesseract};
pub use standard::{StandardEngine, TesseractEngine};
