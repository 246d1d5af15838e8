//! Ledger storage: one row per processed invoice.
//!
//! Stores have no incremental append. Every append loads the whole table,
//! adds rows at the end, and rewrites the file at the same path. There is no
//! locking, so a single writer process is assumed.

mod csv_store;
mod xlsx_store;

pub use csv_store::CsvLedger;
pub use xlsx_store::XlsxLedger;

use std::path::Path;

use tracing::{info, warn};

use crate::error::LedgerError;
use crate::models::record::{InvoiceRecord, LEDGER_COLUMNS};

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// A whole-table store for invoice records.
pub trait LedgerStore: Send + Sync {
    /// Backing file.
    fn path(&self) -> &Path;

    /// Read every row. `Ok(None)` when the store does not exist yet.
    fn read_rows(&self) -> Result<Option<Vec<InvoiceRecord>>>;

    /// Replace the store contents with `records`, header first.
    fn write_all(&self, records: &[InvoiceRecord]) -> Result<()>;

    /// Load the table, or start an empty one when the store is absent or
    /// unreadable. A readable store with the wrong header is an error.
    fn load(&self) -> Result<Vec<InvoiceRecord>> {
        match self.read_rows() {
            Ok(Some(rows)) => Ok(rows),
            Ok(None) => Ok(Vec::new()),
            Err(e @ (LedgerError::SchemaMismatch { .. } | LedgerError::InvalidTotal { .. })) => Err(e),
            Err(e) => {
                warn!(
                    "Could not read ledger {}, starting a new table: {}",
                    self.path().display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    /// Append one record.
    fn append(&self, record: &InvoiceRecord) -> Result<()> {
        self.append_all(std::slice::from_ref(record))
    }

    /// Append records in order after the existing rows.
    fn append_all(&self, records: &[InvoiceRecord]) -> Result<()> {
        let mut rows = self.load()?;
        rows.extend_from_slice(records);
        self.write_all(&rows)?;

        for record in records {
            info!(
                "Added {} to {}: description={:?} total={}",
                record.image_name,
                self.path().display(),
                record.description,
                record
                    .total_sum
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
        }

        Ok(())
    }
}

/// Open the store for `path`, choosing the format from its extension.
pub fn open_ledger(path: &Path) -> Result<Box<dyn LedgerStore>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "xlsx" => Ok(Box::new(XlsxLedger::new(path))),
        "csv" => Ok(Box::new(CsvLedger::new(path))),
        _ => Err(LedgerError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Compare a stored header row against the ledger columns.
fn check_header(found: Vec<String>) -> Result<()> {
    let matches = found.len() == LEDGER_COLUMNS.len()
        && found
            .iter()
            .zip(LEDGER_COLUMNS)
            .all(|(cell, column)| cell.trim() == column);

    if matches {
        Ok(())
    } else {
        Err(LedgerError::SchemaMismatch {
            expected: LEDGER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            found,
        })
    }
}

/// Create the parent directory of a store file if needed.
fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
