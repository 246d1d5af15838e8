//! Core library for the invoice folder watcher.
//!
//! This crate provides:
//! - Text extraction from invoice images (tesseract, or pure Rust ONNX OCR)
//! - Description and total extraction from OCR text
//! - A spreadsheet ledger (xlsx or csv) that invoices are appended to
//! - A directory watcher that drives the above for each new image

pub mod error;
pub mod invoice;
pub mod ledger;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod watch;

pub use error::{LedgerError, OcrError, Result, WatchError};
pub use invoice::{InvoiceParser, ParsedFields, RuleBasedParser};
pub use ledger::{open_ledger, CsvLedger, LedgerStore, XlsxLedger};
pub use models::config::WatchAppConfig;
pub use models::record::{InvoiceRecord, LEDGER_COLUMNS, UNKNOWN_DESCRIPTION};
pub use ocr::{create_backend, ExtractedText, OcrBackend, TesseractBackend, TextExtractor};
pub use pipeline::InvoicePipeline;
pub use watch::{DispatchOutcome, InvoiceDispatcher, InvoiceEvent, InvoiceWatcher};
