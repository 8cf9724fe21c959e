use std::env;

use serde::{Deserialize, Serialize};

fn default_snip() -> String {
    "ctrl+shift+KeyS".to_string()
}

fn default_toggle_mode() -> String {
    "ctrl+shift+KeyM".to_string()
}

/// Global hotkeys in `global-hotkey` notation (`modifier+...+Code`)
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    #[serde(default = "default_snip")]
    pub snip: String,
    #[serde(default = "default_toggle_mode")]
    pub toggle_mode: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            snip: default_snip(),
            toggle_mode: default_toggle_mode(),
        }
    }
}

impl HotkeyConfig {
    pub(crate) fn apply_env(&mut self) {
        if let Ok(snip) = env::var("SNIP_HOTKEY") {
            self.snip = snip;
        }
        if let Ok(toggle) = env::var("TOGGLE_MODE_HOTKEY") {
            self.toggle_mode = toggle;
        }
    }
}
