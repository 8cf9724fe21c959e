use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Absolute screen pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Normalized screen rectangle, `x1 <= x2` and `y1 <= y2` always hold.
///
/// The only way to build one is from two corner points, so a rectangle with a
/// negative extent cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionRect {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl SelectionRect {
    pub fn from_points(a: ScreenPoint, b: ScreenPoint) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> u32 {
        self.x2.abs_diff(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.abs_diff(self.y1)
    }

    pub fn top_left(&self) -> ScreenPoint {
        ScreenPoint::new(self.x1, self.y1)
    }

    /// True when both sides are strictly longer than `min_size`.
    pub fn exceeds(&self, min_size: u32) -> bool {
        self.width() > min_size && self.height() > min_size
    }
}

/// Captured RGBA8 pixels. Read-only once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Wraps raw RGBA8 pixels, `None` if the buffer length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Which OCR backend handles a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionMode {
    /// Tesseract executable, fast general-purpose line recognizer
    #[default]
    Standard,
    /// PaddleOCR models, slower but more accurate
    Advanced,
}

impl RecognitionMode {
    /// Parses a mode name. Anything that is not `advanced` falls back to `Standard`.
    pub fn parse(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("advanced") {
            RecognitionMode::Advanced
        } else {
            RecognitionMode::Standard
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            RecognitionMode::Standard => RecognitionMode::Advanced,
            RecognitionMode::Advanced => RecognitionMode::Standard,
        }
    }
}

// Config files get the same leniency as `parse`
impl<'de> Deserialize<'de> for RecognitionMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(RecognitionMode::parse(&name))
    }
}

impl fmt::Display for RecognitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionMode::Standard => write!(f, "Standard"),
            RecognitionMode::Advanced => write!(f, "Advanced"),
        }
    }
}

/// Events consumed by the backend event loop
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A committed selection was grabbed from the screen
    Captured(Bitmap),
    /// Screen grab failed after a committed selection
    CaptureFailed(String),
    ToggleMode,
}

/// Requests marshalled onto the UI thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    StartSnip,
    Quit,
}
