use anyhow::{Context, Result};
use arboard::Clipboard;

/// Long-lived handle to the system clipboard.
///
/// Kept alive for the whole process: on X11 the owner has to stay around for
/// other applications to paste what was copied.
pub struct ClipboardWriter {
    clipboard: Clipboard,
}

impl ClipboardWriter {
    pub fn new() -> Result<Self> {
        let clipboard = Clipboard::new().context("Failed to open clipboard")?;
        Ok(Self { clipboard })
    }

    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.clipboard
            .set_text(text.to_owned())
            .context("Failed to write clipboard")?;
        tracing::debug!("Copied {} chars to clipboard", text.chars().count());
        Ok(())
    }
}
