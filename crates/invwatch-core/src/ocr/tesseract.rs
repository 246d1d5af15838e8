//! OCR backend driving the `tesseract` command-line engine.

use std::io::Write;
use std::process::{Command, Stdio};

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{encode_png, OcrBackend};

/// Runs `tesseract stdin stdout -l <langs>` with the image piped in as PNG.
pub struct TesseractBackend {
    command: String,
    languages: String,
}

impl TesseractBackend {
    /// Create a backend for an executable and a `+`-joined language set.
    pub fn new(command: impl Into<String>, languages: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            languages: languages.into(),
        }
    }

    /// Create a backend from OCR configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.tesseract_command.clone(), config.language_spec())
    }

    /// Language set passed to `-l`.
    pub fn languages(&self) -> &str {
        &self.languages
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let png = encode_png(image)?;

        debug!(
            "Running {} with languages {} on {} bytes",
            self.command,
            self.languages,
            png.len()
        );

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.languages])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| OcrError::EngineLoad(format!("failed to run {}: {}", self.command, e)))?;

        // A write failure usually means tesseract exited early; its stderr says why.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| OcrError::Recognition(format!("failed to wait for {}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        if let Err(e) = write_result {
            warn!("tesseract closed its input early: {}", e);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
