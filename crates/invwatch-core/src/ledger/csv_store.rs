//! CSV ledger.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use super::{check_header, ensure_parent, LedgerStore, Result};
use crate::error::LedgerError;
use crate::models::record::{InvoiceRecord, LEDGER_COLUMNS};

/// Ledger stored as a comma-separated file with a header row.
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LedgerStore for CsvLedger {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<Option<Vec<InvoiceRecord>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        check_header(reader.headers()?.iter().map(str::to_string).collect())?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            let field = |col: usize| row.get(col).unwrap_or("").to_string();

            let total = match row.get(2).map(str::trim) {
                None | Some("") => None,
                Some(value) => Some(Decimal::from_str(value).map_err(|_| LedgerError::InvalidTotal {
                    row: index + 2,
                    value: value.to_string(),
                })?),
            };

            records.push(InvoiceRecord::new(field(0), field(1), total));
        }

        debug!("Read {} rows from {}", records.len(), self.path.display());
        Ok(Some(records))
    }

    fn write_all(&self, records: &[InvoiceRecord]) -> Result<()> {
        ensure_parent(&self.path)?;

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(LEDGER_COLUMNS)?;

        for record in records {
            let total = record.total_display();
            writer.write_record([
                record.image_name.as_str(),
                record.description.as_str(),
                total.as_str(),
            ])?;
        }

        writer.flush()?;
        debug!("Wrote {} rows to {}", records.len(), self.path.display());
        Ok(())
    }
}
