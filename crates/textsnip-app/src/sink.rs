use std::sync::{Arc, Mutex, PoisonError};

use textsnip_io::clipboard::ClipboardWriter;
use textsnip_ocr::{OcrFailure, RecognitionResult};
use textsnip_types::RecognitionMode;

pub const COPIED_TITLE: &str = "Text Copied to Clipboard";
pub const NO_TEXT_MESSAGE: &str = "No text detected.";

/// User-facing notifications. Must not block.
pub trait Notifier: Send + Sync {
    fn info(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
}

/// Notifier that writes to the log
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, title: &str, message: &str) {
        tracing::info!("[{}] {}", title, message);
    }

    fn error(&self, title: &str, message: &str) {
        tracing::error!("[{}] {}", title, message);
    }
}

pub trait TextClipboard: Send + Sync {
    fn copy(&self, text: &str) -> anyhow::Result<()>;
}

/// System clipboard, opened on first use and kept for the process lifetime.
#[derive(Default)]
pub struct SystemClipboard {
    writer: Mutex<Option<ClipboardWriter>>,
}

impl TextClipboard for SystemClipboard {
    fn copy(&self, text: &str) -> anyhow::Result<()> {
        let mut slot = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let writer = match slot.take() {
            Some(writer) => writer,
            None => ClipboardWriter::new()?,
        };
        slot.insert(writer).write_text(text)
    }
}

/// What happened to one recognition result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Copied { preview: String },
    NothingFound,
    Failed(String),
}

/// First `max_chars` characters of `text`, with `...` appended if anything was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Delivers recognition results to the clipboard and the user.
pub struct ResultSink {
    clipboard: Arc<dyn TextClipboard>,
    notifier: Arc<dyn Notifier>,
    preview_chars: usize,
}

impl ResultSink {
    pub fn new(
        clipboard: Arc<dyn TextClipboard>,
        notifier: Arc<dyn Notifier>,
        preview_chars: usize,
    ) -> Self {
        Self {
            clipboard,
            notifier,
            preview_chars,
        }
    }

    pub fn deliver(&self, result: &RecognitionResult) -> Delivery {
        match result {
            Ok(recognition) if recognition.is_empty() => {
                self.notifier.info("textsnip", NO_TEXT_MESSAGE);
                Delivery::NothingFound
            }
            Ok(recognition) => match self.clipboard.copy(&recognition.text) {
                Ok(()) => {
                    let preview = preview(&recognition.text, self.preview_chars);
                    self.notifier.info(COPIED_TITLE, &preview);
                    Delivery::Copied { preview }
                }
                Err(e) => {
                    let message = format!("{e:#}");
                    self.notifier.error("Clipboard error", &message);
                    Delivery::Failed(message)
                }
            },
            Err(failure) => {
                let title = match failure {
                    OcrFailure::BackendUnavailable => "OCR unavailable",
                    OcrFailure::EngineError(_) | OcrFailure::TimedOut(_) => "OCR failed",
                };
                let message = failure.to_string();
                self.notifier.error(title, &message);
                Delivery::Failed(message)
            }
        }
    }

    pub fn capture_failed(&self, message: &str) {
        self.notifier.error("Capture failed", message);
    }

    pub fn mode_changed(&self, mode: RecognitionMode) {
        self.notifier.info("OCR mode", &format!("{mode} OCR selected"));
    }
}
