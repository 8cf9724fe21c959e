use textsnip_types::{ScreenPoint, SelectionRect};

/// Rectangle in overlay-local logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Maps overlay-local logical coordinates to absolute screen pixels.
///
/// `origin` is the physical screen position of the overlay's top-left corner and
/// `scale` the overlay's device pixel ratio. The mapping is fixed for the whole
/// session, so a drag keeps one consistent frame even if the window manager
/// nudges the overlay while it is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayGeometry {
    pub origin: ScreenPoint,
    pub scale: f32,
}

impl Default for OverlayGeometry {
    fn default() -> Self {
        Self {
            origin: ScreenPoint::new(0, 0),
            scale: 1.0,
        }
    }
}

impl OverlayGeometry {
    pub fn new(origin: ScreenPoint, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self { origin, scale }
    }

    pub fn to_screen(&self, x: f32, y: f32) -> ScreenPoint {
        ScreenPoint::new(
            self.origin.x + (x * self.scale).round() as i32,
            self.origin.y + (y * self.scale).round() as i32,
        )
    }

    pub fn to_local(&self, rect: &SelectionRect) -> LocalRect {
        LocalRect {
            x: (rect.x1() - self.origin.x) as f32 / self.scale,
            y: (rect.y1() - self.origin.y) as f32 / self.scale,
            width: rect.width() as f32 / self.scale,
            height: rect.height() as f32 / self.scale,
        }
    }
}
