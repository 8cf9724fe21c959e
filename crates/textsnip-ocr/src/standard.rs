use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use textsnip_types::Bitmap;

use crate::locate::{hide_console, locate_tesseract};

/// Line recognizer backed by an external executable.
pub trait StandardEngine: Send + Sync {
    /// Run discovery. True once an executable is usable.
    fn locate(&self) -> bool;

    /// Raw (untrimmed) recognizer output for the bitmap.
    fn image_to_string(&self, bitmap: &Bitmap) -> Result<String>;
}

/// Tesseract driven through its command-line interface
pub struct TesseractEngine {
    language: String,
    extra_paths: Vec<PathBuf>,
    command: Mutex<Option<PathBuf>>,
}

impl TesseractEngine {
    pub fn new(language: impl Into<String>, extra_paths: Vec<PathBuf>) -> Self {
        Self {
            language: language.into(),
            extra_paths,
            command: Mutex::new(None),
        }
    }

    /// Path of the located executable, if discovery has succeeded
    pub fn command(&self) -> Option<PathBuf> {
        self.command
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StandardEngine for TesseractEngine {
    fn locate(&self) -> bool {
        let found = locate_tesseract(&self.extra_paths);
        let ready = found.is_some();
        *self.command.lock().unwrap_or_else(PoisonError::into_inner) = found;
        ready
    }

    fn image_to_string(&self, bitmap: &Bitmap) -> Result<String> {
        let program = self.command().context("Tesseract has not been located")?;
        let png = encode_png(bitmap)?;

        let mut command = Command::new(&program);
        command
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_console(&mut command);

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to start {}", program.display()))?;

        // Tesseract reads the whole image before writing anything.
        {
            let mut stdin = child.stdin.take().context("Tesseract stdin unavailable")?;
            stdin
                .write_all(&png)
                .context("Failed to send image to Tesseract")?;
        }

        let output = child
            .wait_with_output()
            .context("Failed to wait for Tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Tesseract exited with {}: {}", output.status, stderr.trim());
        }

        tracing::debug!("Tesseract produced {} bytes", output.stdout.len());
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

pub(crate) fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            bitmap.as_rgba(),
            bitmap.width(),
            bitmap.height(),
            image::ExtendedColorType::Rgba8,
        )
        .context("Failed to encode PNG")?;
    Ok(buffer)
}
