//! Tesseract subprocess engine.
//!
//! Saves the buffer to a temporary PNG and shells out to the `tesseract`
//! executable, reading recognized text from stdout. The subprocess is driven
//! through tokio so a slow recognition suspends the calling task instead of
//! blocking the runtime.

use image::{ImageBuffer, Rgba};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::{OcrEngine, OcrHints};
use crate::error::{Result, ScanError};

/// OCR engine backed by a local Tesseract installation.
#[derive(Clone, Debug)]
pub struct TesseractEngine {
    executable: PathBuf,
    /// Page segmentation mode; 6 = single uniform block of text
    psm: u8,
}

impl TesseractEngine {
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from("tesseract"),
            psm: 6,
        }
    }

    /// Uses a specific executable instead of whatever is on PATH.
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            ..Self::new()
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractEngine {
    async fn recognize(
        &self,
        img: ImageBuffer<Rgba<u8>, Vec<u8>>,
        hints: OcrHints,
    ) -> Result<String> {
        // PNG encoding is CPU-bound; keep it off the async threads.
        let temp_input = tokio::task::spawn_blocking(move || -> Result<NamedTempFile> {
            let file = NamedTempFile::with_suffix(".png")?;
            img.save(file.path())?;
            Ok(file)
        })
        .await
        .map_err(|e| ScanError::Ocr(format!("image encode task failed: {e}")))??;

        let mut command = Command::new(&self.executable);
        command
            .arg(temp_input.path())
            .arg("stdout")
            .arg("-l")
            .arg(hints.languages.join("+"))
            .arg("--psm")
            .arg(self.psm.to_string());
        if !hints.char_blacklist.is_empty() {
            command
                .arg("-c")
                .arg(format!("tessedit_char_blacklist={}", hints.char_blacklist));
        }

        let output = command
            .output()
            .await
            .map_err(|e| ScanError::Ocr(format!("failed to run tesseract: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanError::Ocr(format!("tesseract failed: {stderr}")));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
