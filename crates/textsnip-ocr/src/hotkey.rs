use anyhow::{Context, Result};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};

/// Registered global hotkeys, each bound to an action value.
///
/// Create it on the thread that runs the platform event loop and keep it alive;
/// dropping it unregisters everything. Presses are read through a
/// [`HotkeyListener`], which can live on any thread.
pub struct HotkeyManager<T> {
    manager: GlobalHotKeyManager,
    bindings: Vec<(HotKey, T)>,
}

impl<T: Copy> HotkeyManager<T> {
    /// Register every binding, e.g. `("ctrl+shift+KeyS", Action::Snip)`.
    pub fn new(bindings: &[(&str, T)]) -> Result<Self> {
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;

        let mut registered = Vec::with_capacity(bindings.len());
        for (combo, action) in bindings {
            let hotkey: HotKey = combo
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid hotkey {:?}: {}", combo, e))?;
            manager
                .register(hotkey)
                .with_context(|| format!("Failed to register hotkey {combo}"))?;
            registered.push((hotkey, *action));
        }

        Ok(Self {
            manager,
            bindings: registered,
        })
    }

    pub fn listener(&self) -> HotkeyListener<T> {
        HotkeyListener {
            bindings: self
                .bindings
                .iter()
                .map(|(hotkey, action)| (hotkey.id(), *action))
                .collect(),
        }
    }
}

impl<T> Drop for HotkeyManager<T> {
    fn drop(&mut self) {
        for (hotkey, _) in &self.bindings {
            let _ = self.manager.unregister(*hotkey);
        }
    }
}

/// Maps hotkey press events back to actions.
#[derive(Debug, Clone)]
pub struct HotkeyListener<T> {
    bindings: Vec<(u32, T)>,
}

impl<T: Copy> HotkeyListener<T> {
    /// Action of the next pressed hotkey, if any (non-blocking)
    pub fn poll(&self) -> Option<T> {
        let receiver = GlobalHotKeyEvent::receiver();
        while let Ok(event) = receiver.try_recv() {
            if event.state != HotKeyState::Pressed {
                continue;
            }
            match self.action(event.id) {
                Some(action) => return Some(action),
                None => tracing::debug!("Ignoring unknown hotkey id {}", event.id),
            }
        }
        None
    }

    fn action(&self, id: u32) -> Option<T> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == id)
            .map(|(_, action)| *action)
    }
}
