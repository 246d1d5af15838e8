//! The per-invoice chain: OCR, field parsing, ledger append.

use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::invoice::{InvoiceParser, RuleBasedParser};
use crate::ledger::{open_ledger, LedgerStore};
use crate::models::config::WatchAppConfig;
use crate::models::record::InvoiceRecord;
use crate::ocr::TextExtractor;

/// Drives one image from pixels to a ledger row.
pub struct InvoicePipeline {
    extractor: TextExtractor,
    parser: Box<dyn InvoiceParser>,
    ledger: Box<dyn LedgerStore>,
}

impl InvoicePipeline {
    /// Assemble a pipeline from its stages.
    pub fn new(
        extractor: TextExtractor,
        parser: Box<dyn InvoiceParser>,
        ledger: Box<dyn LedgerStore>,
    ) -> Self {
        Self {
            extractor,
            parser,
            ledger,
        }
    }

    /// Build the pipeline described by the configuration.
    pub fn from_config(config: &WatchAppConfig) -> Result<Self> {
        let extractor = TextExtractor::from_config(&config.ocr)?;
        let ledger = open_ledger(&config.ledger.path)?;

        debug!(
            "Pipeline ready: ocr={} ledger={}",
            extractor.backend_name(),
            ledger.path().display()
        );

        Ok(Self::new(extractor, Box::new(RuleBasedParser::new()), ledger))
    }

    /// The ledger rows are appended to.
    pub fn ledger(&self) -> &dyn LedgerStore {
        self.ledger.as_ref()
    }

    /// OCR and parse an image without touching the ledger.
    pub fn extract(&self, path: &Path) -> Result<InvoiceRecord> {
        let extracted = self.extractor.extract_text(path)?;
        let parsed = self.parser.parse(&extracted.text);

        debug!(
            "Parsed {} in {}us (ocr {}ms), total matched from {:?}",
            path.display(),
            parsed.processing_time_us,
            extracted.processing_time_ms,
            parsed.total_source
        );

        Ok(InvoiceRecord::for_image(
            path,
            parsed.fields.description,
            parsed.fields.total_sum,
        ))
    }

    /// OCR, parse, and append the image's record to the ledger.
    pub fn process(&self, path: &Path) -> Result<InvoiceRecord> {
        let record = self.extract(path)?;
        self.ledger.append(&record)?;

        info!("Ledger updated with {}", record.image_name);
        Ok(record)
    }
}
