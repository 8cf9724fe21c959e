use serde::{Deserialize, Serialize};

use crate::env_parse;

fn default_min_selection_size() -> u32 {
    5
}

fn default_overlay_alpha() -> f32 {
    0.3
}

fn default_capture_settle_ms() -> u64 {
    60
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    /// Selections with either side at or below this many pixels are discarded
    #[serde(default = "default_min_selection_size")]
    pub min_selection_size: u32,
    #[serde(default = "default_overlay_alpha")]
    pub overlay_alpha: f32,
    /// Delay between hiding the overlay and grabbing the screen
    #[serde(default = "default_capture_settle_ms")]
    pub capture_settle_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            min_selection_size: default_min_selection_size(),
            overlay_alpha: default_overlay_alpha(),
            capture_settle_ms: default_capture_settle_ms(),
        }
    }
}

impl UiConfig {
    /// Overlay fill alpha, kept inside the 0.2..=0.4 band.
    pub fn clamped_alpha(&self) -> f32 {
        if self.overlay_alpha.is_nan() {
            return default_overlay_alpha();
        }
        self.overlay_alpha.clamp(0.2, 0.4)
    }

    pub(crate) fn apply_env(&mut self) {
        if let Some(size) = env_parse("MIN_SELECTION_SIZE") {
            self.min_selection_size = size;
        }
        if let Some(alpha) = env_parse("OVERLAY_ALPHA") {
            self.overlay_alpha = alpha;
        }
        if let Some(ms) = env_parse("CAPTURE_SETTLE_MS") {
            self.capture_settle_ms = ms;
        }
    }
}
