//! Text extraction from invoice images.
//!
//! Images are decoded with the `image` crate and handed to an [`OcrBackend`].
//! The default backend drives the `tesseract` executable. Tesseract linked
//! in-process is available behind the `leptess` feature, and a pure Rust ONNX
//! engine behind the `onnx` feature.
//!
//! Decoding and recognition failures both surface as [`OcrError`]; the
//! extractor does not check the file before decoding it, so a half-written
//! image fails here rather than earlier.

#[cfg(feature = "leptess")]
mod leptess_engine;
#[cfg(feature = "onnx")]
mod pure_engine;
mod tesseract;

#[cfg(feature = "leptess")]
pub use leptess_engine::LeptessBackend;
#[cfg(feature = "onnx")]
pub use pure_engine::PureOcrBackend;
pub use tesseract::TesseractBackend;

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{OcrBackendKind, OcrConfig};

/// An OCR engine: decoded image in, recognized text out.
pub trait OcrBackend: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Recognize all text in the image. May return an empty string.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Raw OCR output for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Full recognized text, possibly multi-line or empty.
    pub text: String,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),

    /// Recognition time in milliseconds.
    pub processing_time_ms: u64,
}

/// Loads images and runs them through an OCR backend.
pub struct TextExtractor {
    backend: Box<dyn OcrBackend>,
}

impl TextExtractor {
    /// Wrap a backend.
    pub fn new(backend: Box<dyn OcrBackend>) -> Self {
        Self { backend }
    }

    /// Build the extractor described by the configuration.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        Ok(Self::new(create_backend(config)?))
    }

    /// Name of the underlying engine.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Decode the image at `path` and recognize its text.
    pub fn extract_text(&self, path: &Path) -> Result<ExtractedText, OcrError> {
        let start = Instant::now();

        let image = image::open(path)?;
        let (width, height) = image.dimensions();
        debug!("Decoded {} ({}x{})", path.display(), width, height);

        let text = self.backend.recognize(&image)?;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "OCR complete: {} chars from {} in {}ms",
            text.len(),
            path.display(),
            processing_time_ms
        );

        Ok(ExtractedText {
            text,
            image_size: (width, height),
            processing_time_ms,
        })
    }
}

/// Create the OCR backend selected by the configuration.
pub fn create_backend(config: &OcrConfig) -> Result<Box<dyn OcrBackend>, OcrError> {
    match config.backend {
        OcrBackendKind::Tesseract => Ok(Box::new(TesseractBackend::from_config(config))),
        #[cfg(feature = "leptess")]
        OcrBackendKind::Leptess => Ok(Box::new(LeptessBackend::from_config(config))),
        #[cfg(not(feature = "leptess"))]
        OcrBackendKind::Leptess => Err(OcrError::Unavailable(
            "leptess backend requires building with --features leptess".to_string(),
        )),
        #[cfg(feature = "onnx")]
        OcrBackendKind::Onnx => Ok(Box::new(PureOcrBackend::from_dir(&config.model_dir)?)),
        #[cfg(not(feature = "onnx"))]
        OcrBackendKind::Onnx => Err(OcrError::Unavailable(
            "onnx backend requires building with --features onnx".to_string(),
        )),
    }
}

/// Re-encode a decoded image as RGB PNG bytes for tesseract.
fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| OcrError::Recognition(format!("failed to encode image for tesseract: {}", e)))?;
    Ok(png)
}
