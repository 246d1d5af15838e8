//! Pure Rust OCR backend using `pure-onnx-ocr`.
//!
//! Only Latin-script models are available for this engine, so Cyrillic and
//! Hebrew invoices need the tesseract backend.

use std::path::Path;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;

use super::OcrBackend;

/// OCR backend backed by `pure-onnx-ocr` (no external ONNX Runtime).
pub struct PureOcrBackend {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl PureOcrBackend {
    /// Create an engine from model files in a directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::EngineLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine })
    }
}

impl OcrBackend for PureOcrBackend {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let (width, height) = image.dimensions();
        debug!("Running pure-onnx-ocr on {}x{} image", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        // Reading order: 20px rows top to bottom, then left to right.
        let mut lines: Vec<(i32, f64, String)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                ((y / 20.0) as i32, x, r.text.replace("[UNK]", " "))
            })
            .collect();
        lines.sort_by(|(row_a, x_a, _), (row_b, x_b, _)| {
            row_a
                .cmp(row_b)
                .then(x_a.partial_cmp(x_b).unwrap_or(std::cmp::Ordering::Equal))
        });

        debug!("pure-onnx-ocr returned {} text regions", lines.len());

        Ok(lines
            .into_iter()
            .map(|(_, _, text)| text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Minimum x and y over the first four polygon points.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}
