//! Data models and configuration.

pub mod config;
pub mod record;

pub use config::{
    LedgerConfig, OcrBackendKind, OcrConfig, StabilizationConfig, WatchAppConfig, WatchConfig,
};
pub use record::{InvoiceRecord, LEDGER_COLUMNS, UNKNOWN_DESCRIPTION};
