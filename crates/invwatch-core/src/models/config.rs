//! Configuration structures for the watcher pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, WatchError};

/// Main configuration for invwatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchAppConfig {
    /// Directory watching configuration.
    pub watch: WatchConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Ledger configuration.
    pub ledger: LedgerConfig,
}

/// Directory watching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory to watch (created if absent).
    pub directory: PathBuf,

    /// Accepted file extensions, without the leading dot. Matched case-insensitively.
    pub extensions: Vec<String>,

    /// How to wait for a new file to finish being written.
    pub stabilization: StabilizationConfig,

    /// Granularity of the foreground idle loop, in seconds.
    pub idle_poll_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("invoices"),
            extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
            stabilization: StabilizationConfig::default(),
            idle_poll_secs: 10,
        }
    }
}

impl WatchConfig {
    /// Check whether a path carries one of the accepted extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.extensions
            .iter()
            .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }

    /// Idle loop interval as a `Duration`.
    pub fn idle_poll(&self) -> Duration {
        Duration::from_secs(self.idle_poll_secs)
    }
}

/// Write-completion policy applied before an accepted file is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum StabilizationConfig {
    /// Sleep a fixed time after the creation event.
    FixedDelay { delay_ms: u64 },

    /// Poll the file size until it stops changing.
    SizeStable {
        interval_ms: u64,
        stable_checks: u32,
        timeout_ms: u64,
    },
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self::FixedDelay { delay_ms: 2000 }
    }
}

/// Which OCR engine to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackendKind {
    /// External `tesseract` executable.
    #[default]
    Tesseract,
    /// Tesseract linked in-process through leptess (requires the `leptess` feature).
    Leptess,
    /// Pure Rust ONNX engine (requires the `onnx` feature).
    Onnx,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine to use.
    pub backend: OcrBackendKind,

    /// Tesseract language codes, recognized simultaneously.
    pub languages: Vec<String>,

    /// Name or path of the tesseract executable.
    pub tesseract_command: String,

    /// Model directory for the ONNX engine.
    pub model_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendKind::default(),
            languages: vec!["eng".to_string(), "rus".to_string(), "heb".to_string()],
            tesseract_command: "tesseract".to_string(),
            model_dir: PathBuf::from("models"),
        }
    }
}

impl OcrConfig {
    /// Language set in tesseract's `-l` syntax (`eng+rus+heb`).
    pub fn language_spec(&self) -> String {
        self.languages.join("+")
    }
}

/// Ledger store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Store file. The extension selects the format (`.xlsx` or `.csv`).
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("invoices.xlsx"),
        }
    }
}

impl WatchAppConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| WatchError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| WatchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
