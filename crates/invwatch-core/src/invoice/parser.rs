//! Rule-based invoice parser.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::debug;

use super::rules::{extract_description, FieldExtractor, TotalExtractor};

/// Fields parsed from one invoice's OCR text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFields {
    /// First line of the text, or the unknown-invoice sentinel.
    pub description: String,
    /// First labeled total, if any.
    pub total_sum: Option<Decimal>,
}

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Parsed fields.
    pub fields: ParsedFields,
    /// Text the total was matched from, if any.
    pub total_source: Option<String>,
    /// Processing time in microseconds.
    pub processing_time_us: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser: Send + Sync {
    /// Parse invoice fields from text.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Parser using the description and total rules.
#[derive(Default)]
pub struct RuleBasedParser {
    totals: TotalExtractor,
}

impl RuleBasedParser {
    /// Create a parser with the default rules.
    pub fn new() -> Self {
        Self::default()
    }
}

impl InvoiceParser for RuleBasedParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        let description = extract_description(text);
        let total = self.totals.extract(text);

        debug!(
            "Parsed description {:?}, total {:?}",
            description,
            total.as_ref().map(|m| m.value)
        );

        ExtractionResult {
            total_source: total.as_ref().map(|m| m.source.clone()),
            fields: ParsedFields {
                description,
                total_sum: total.map(|m| m.value),
            },
            processing_time_us: start.elapsed().as_micros() as u64,
        }
    }
}
