//! Tesseract linked in-process through `leptess`.

use image::DynamicImage;
use leptess::LepTess;
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{encode_png, OcrBackend};

/// In-process tesseract. A fresh engine is created per image, so the backend
/// holds no engine state between calls.
pub struct LeptessBackend {
    languages: String,
}

impl LeptessBackend {
    /// Create a backend for a `+`-joined language set, using tesseract's own
    /// tessdata lookup.
    pub fn new(languages: impl Into<String>) -> Self {
        Self {
            languages: languages.into(),
        }
    }

    /// Create a backend from OCR configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.language_spec())
    }

    fn engine(&self) -> Result<LepTess, OcrError> {
        LepTess::new(None, &self.languages)
            .map_err(|e| OcrError::EngineLoad(format!("tesseract init ({}): {}", self.languages, e)))
    }
}

impl OcrBackend for LeptessBackend {
    fn name(&self) -> &str {
        "leptess"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let png = encode_png(image)?;

        let mut lt = self.engine()?;
        lt.set_image_from_mem(&png)
            .map_err(|e| OcrError::Recognition(format!("tesseract set image: {}", e)))?;

        debug!("Running leptess with languages {}", self.languages);

        lt.get_utf8_text()
            .map_err(|e| OcrError::Recognition(format!("tesseract run: {}", e)))
    }
}
