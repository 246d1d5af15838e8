//! Invoice records as stored in the ledger.

use std::fmt;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Description used when the OCR text has no usable first line.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown Invoice";

/// Ledger column headers, in storage order.
pub const LEDGER_COLUMNS: [&str; 3] = ["Image Name", "Description", "Total Sum"];

/// One processed invoice, one ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Base file name of the source image.
    pub image_name: String,

    /// First line of the recognized text.
    pub description: String,

    /// Total as captured from the text, two fractional digits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sum: Option<Decimal>,
}

impl InvoiceRecord {
    /// Create a record.
    pub fn new(
        image_name: impl Into<String>,
        description: impl Into<String>,
        total_sum: Option<Decimal>,
    ) -> Self {
        Self {
            image_name: image_name.into(),
            description: description.into(),
            total_sum,
        }
    }

    /// Build a record for the image at `path`, keeping only its file name.
    pub fn for_image(path: &Path, description: impl Into<String>, total_sum: Option<Decimal>) -> Self {
        Self::new(image_name(path), description, total_sum)
    }

    /// Total formatted for display and text storage; empty when absent.
    pub fn total_display(&self) -> String {
        self.total_sum.map(|t| t.to_string()).unwrap_or_default()
    }
}

impl fmt::Display for InvoiceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total_sum {
            Some(total) => write!(f, "{} | {} | {}", self.image_name, self.description, total),
            None => write!(f, "{} | {} | -", self.image_name, self.description),
        }
    }
}

/// Base file name of a path, lossily converted.
pub fn image_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
