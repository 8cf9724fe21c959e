use anyhow::Context;
use slint::{ComponentHandle, PhysicalPosition, PhysicalSize};
use textsnip_core::{LocalRect, Overlay, OverlayGeometry};

use crate::SnipOverlay;

/// [`Overlay`] backed by one reusable slint window.
///
/// The window is created once and shown/hidden per session. Dropping it from
/// inside its own input callbacks is not allowed, so `close` only hides.
pub struct SlintOverlay {
    window: SnipOverlay,
    open: bool,
}

impl SlintOverlay {
    pub fn new(window: SnipOverlay) -> Self {
        Self {
            window,
            open: false,
        }
    }
}

impl Overlay for SlintOverlay {
    fn open(&mut self) -> anyhow::Result<OverlayGeometry> {
        let bounds = textsnip_ocr::virtual_screen().context("Failed to read monitor layout")?;
        let origin = bounds.top_left();

        let window = self.window.window();
        window.set_position(PhysicalPosition::new(origin.x, origin.y));
        window.set_size(PhysicalSize::new(bounds.width(), bounds.height()));

        self.window.set_has_selection(false);
        self.window.show().context("Failed to show overlay window")?;
        self.open = true;

        let placed = window.position();
        if placed.x != origin.x || placed.y != origin.y {
            tracing::warn!(
                "Overlay placed at ({}, {}) instead of ({}, {})",
                placed.x,
                placed.y,
                origin.x,
                origin.y
            );
        }

        tracing::debug!(
            "Overlay covers {}x{} at ({}, {})",
            bounds.width(),
            bounds.height(),
            origin.x,
            origin.y
        );
        Ok(OverlayGeometry::new(origin, window.scale_factor()))
    }

    fn draw_selection(&mut self, rect: LocalRect) {
        self.window.set_sel_x(rect.x);
        self.window.set_sel_y(rect.y);
        self.window.set_sel_width(rect.width);
        self.window.set_sel_height(rect.height);
        self.window.set_has_selection(true);
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.window.set_has_selection(false);
        if let Err(e) = self.window.hide() {
            tracing::warn!("Failed to hide overlay: {}", e);
        }
        self.open = false;
    }
}
