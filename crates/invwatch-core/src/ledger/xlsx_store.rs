//! Excel workbook ledger.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use tracing::debug;

use super::{check_header, ensure_parent, LedgerStore, Result};
use crate::error::LedgerError;
use crate::models::record::{InvoiceRecord, LEDGER_COLUMNS};

const SHEET_NAME: &str = "Invoices";
const COLUMN_WIDTHS: [f64; 3] = [32.0, 48.0, 14.0];

/// Ledger stored as the first worksheet of an `.xlsx` workbook.
pub struct XlsxLedger {
    path: PathBuf,
}

impl XlsxLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LedgerStore for XlsxLedger {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<Option<Vec<InvoiceRecord>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut workbook: Xlsx<_> = open_workbook(&self.path)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range?,
            None => return Ok(Some(Vec::new())),
        };

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(Some(Vec::new()));
        };
        check_header(header.iter().map(cell_text).collect())?;

        let mut records = Vec::new();
        for (index, row) in rows.enumerate() {
            let text = |col: usize| row.get(col).map(cell_text).unwrap_or_default();
            let total = match row.get(2) {
                Some(cell) => cell_total(cell).map_err(|value| LedgerError::InvalidTotal {
                    row: index + 2,
                    value,
                })?,
                None => None,
            };
            records.push(InvoiceRecord::new(text(0), text(1), total));
        }

        debug!("Read {} rows from {}", records.len(), self.path.display());
        Ok(Some(records))
    }

    fn write_all(&self, records: &[InvoiceRecord]) -> Result<()> {
        ensure_parent(&self.path)?;

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let total_format = Format::new().set_align(FormatAlign::Right);

        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, (title, width)) in LEDGER_COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
            sheet.set_column_width(col as u16, width)?;
        }

        for (index, record) in records.iter().enumerate() {
            let row = (index + 1) as u32;
            sheet.write_string(row, 0, record.image_name.as_str())?;
            sheet.write_string(row, 1, record.description.as_str())?;
            // Text keeps the captured digits; a float cell would round large sums.
            if let Some(total) = record.total_sum {
                sheet.write_string_with_format(row, 2, total.to_string(), &total_format)?;
            }
        }

        workbook.save(&self.path)?;
        debug!("Wrote {} rows to {}", records.len(), self.path.display());
        Ok(())
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Read a total cell back at two decimal places.
///
/// Totals are written as text. Numeric cells only appear when a workbook was
/// edited by hand and are accepted on a best-effort basis.
fn cell_total(cell: &Data) -> std::result::Result<Option<Decimal>, String> {
    let value = match cell {
        Data::Empty => return Ok(None),
        Data::Float(f) => Decimal::from_f64_retain(*f).ok_or_else(|| f.to_string())?,
        Data::Int(i) => Decimal::from(*i),
        Data::String(s) if s.trim().is_empty() => return Ok(None),
        Data::String(s) => Decimal::from_str(s.trim()).map_err(|_| s.clone())?,
        other => return Err(other.to_string()),
    };

    let mut value = value.round_dp(2);
    value.rescale(2);
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_survive_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = XlsxLedger::new(dir.path().join("invoices.xlsx"));
        let totals = ["45.00", "0.10", "123456.78", "19.99"];

        let records: Vec<_> = totals
            .iter()
            .enumerate()
            .map(|(i, t)| InvoiceRecord::new(format!("{i}.png"), "x", Some(Decimal::from_str(t).unwrap())))
            .collect();
        ledger.write_all(&records).unwrap();

        let loaded = ledger.load().unwrap();
        let loaded_totals: Vec<String> = loaded
            .iter()
            .map(|r| r.total_sum.unwrap().to_string())
            .collect();
        assert_eq!(loaded_totals, totals);
    }

    #[test]
    fn test_large_totals_reload_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = XlsxLedger::new(dir.path().join("invoices.xlsx"));
        let long = Decimal::from_str("12345678901234567.89").unwrap();
        let widest = Decimal::from_str("792281625142643375935439503.35").unwrap();

        ledger.append(&InvoiceRecord::new("a.png", "Long", Some(long))).unwrap();
        assert_eq!(ledger.load().unwrap()[0].total_sum.unwrap().to_string(), "12345678901234567.89");

        ledger.append(&InvoiceRecord::new("b.png", "Widest", Some(widest))).unwrap();
        ledger.append(&InvoiceRecord::new("c.png", "Max", Some(Decimal::MAX))).unwrap();
        ledger.append(&InvoiceRecord::new("d.png", "None", None)).unwrap();

        let totals: Vec<Option<Decimal>> = ledger.load().unwrap().iter().map(|r| r.total_sum).collect();
        assert_eq!(totals, vec![Some(long), Some(widest), Some(Decimal::MAX), None]);
        assert_eq!(totals[1].unwrap().to_string(), "792281625142643375935439503.35");
    }

    #[test]
    fn test_header_row_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.xlsx");
        XlsxLedger::new(&path).write_all(&[]).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let header: Vec<String> = range.rows().next().unwrap().iter().map(cell_text).collect();

        assert_eq!(header, LEDGER_COLUMNS);
    }

    #[test]
    fn test_cell_total() {
        assert_eq!(cell_total(&Data::Empty), Ok(None));
        assert_eq!(cell_total(&Data::Int(7)).unwrap().unwrap().to_string(), "7.00");
        assert_eq!(
            cell_total(&Data::String(" 12.30 ".to_string())).unwrap().unwrap().to_string(),
            "12.30"
        );
        assert!(cell_total(&Data::String("n/a".to_string())).is_err());
    }
}
