//! Error types for the invwatch-core library.

use thiserror::Error;

/// Main error type for the invwatch library.
#[derive(Error, Debug)]
pub enum WatchError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Ledger read or write error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Filesystem notification error.
    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The watcher was started twice or stopped before starting.
    #[error("watcher is {0}")]
    Lifecycle(&'static str),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Failed to start or load the OCR engine.
    #[error("failed to load engine: {0}")]
    EngineLoad(String),

    /// The engine ran but reported a failure.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The requested backend is not compiled into this build.
    #[error("OCR backend not available: {0}")]
    Unavailable(String),
}

/// Errors related to the ledger store.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Writing the spreadsheet failed.
    #[error("failed to write workbook: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Reading the spreadsheet failed.
    #[error("failed to read workbook: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    /// CSV read or write failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The stored header row does not match the ledger columns.
    #[error("ledger header mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A stored total could not be read back as a decimal.
    #[error("invalid total in row {row}: {value}")]
    InvalidTotal { row: usize, value: String },

    /// The ledger path has an extension we cannot store to.
    #[error("unsupported ledger format: {0}")]
    UnsupportedFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the invwatch library.
pub type Result<T> = std::result::Result<T, WatchError>;
