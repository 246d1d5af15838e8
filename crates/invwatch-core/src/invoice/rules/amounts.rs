//! Total amount extraction.

use regex::Captures;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use super::patterns::TOTAL_PATTERN;
use super::{ExtractionMatch, FieldExtractor};

/// Extractor for the labeled invoice total.
pub struct TotalExtractor;

impl TotalExtractor {
    pub fn new() -> Self {
        Self
    }

    fn to_match(caps: &Captures<'_>) -> Option<ExtractionMatch<Decimal>> {
        let full_match = caps.get(0)?;
        let digits = &caps[1];

        // `from_str` rounds away fractional digits it cannot hold, so a
        // surviving scale of 2 means the amount is exact.
        match Decimal::from_str(digits) {
            Ok(amount) if amount.scale() == 2 => Some(
                ExtractionMatch::new(amount, full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            ),
            _ => {
                warn!("Total {} is too large to store exactly, treating as absent", digits);
                None
            }
        }
    }
}

impl Default for TotalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TotalExtractor {
    type Output = ExtractionMatch<Decimal>;

    /// Only the first labeled amount counts; later ones are never a fallback.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        TOTAL_PATTERN
            .captures(text)
            .and_then(|caps| Self::to_match(&caps))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TOTAL_PATTERN
            .captures_iter(text)
            .filter_map(|caps| Self::to_match(&caps))
            .collect()
    }
}

/// Extract the first labeled total from invoice text.
pub fn extract_total(text: &str) -> Option<Decimal> {
    TotalExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_extract_total_any_case() {
        assert_eq!(extract_total("Total: 123.45"), Some(dec("123.45")));
        assert_eq!(extract_total("TOTAL 123.45"), Some(dec("123.45")));
        assert_eq!(extract_total("grand tOtAl:: 123.45 EUR"), Some(dec("123.45")));
        assert_eq!(extract_total("Total:\n  9.99"), Some(dec("9.99")));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let text = "Total: 10.00\nTotal: 20.00";
        assert_eq!(extract_total(text), Some(dec("10.00")));

        let all = TotalExtractor::new().extract_all(text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].position, Some((0, 12)));
        assert_eq!(all[1].source, "Total: 20.00");
    }

    #[test]
    fn test_scale_is_preserved() {
        let total = extract_total("Total: 45.00").unwrap();
        assert_eq!(total.scale(), 2);
        assert_eq!(total.to_string(), "45.00");
    }

    #[test]
    fn test_non_ascii_digits_do_not_match() {
        assert_eq!(extract_total("Total: ١٢.٣٤"), None);
        assert_eq!(extract_total("X\nTotal: ١٢.٣٤\nTotal: 5.00"), Some(dec("5.00")));
    }

    #[test]
    fn test_inexact_first_total_is_absent() {
        // Decimal::MAX followed by two places does not fit.
        assert_eq!(extract_total("Big\nTotal: 79228162514264337593543950335.00"), None);
        assert_eq!(
            extract_total("Total: 79228162514264337593543950335.00\nTotal: 5.00"),
            None
        );

        let widest = extract_total("Total: 792281625142643375935439503.35").unwrap();
        assert_eq!(widest.scale(), 2);
        assert_eq!(widest.to_string(), "792281625142643375935439503.35");
    }

    #[test]
    fn test_narrow_pattern_rejects() {
        assert_eq!(extract_total("No total here"), None);
        assert_eq!(extract_total("Total: 45"), None);
        assert_eq!(extract_total("Total: 45.5"), None);
        assert_eq!(extract_total("Total: $45.00"), None);
        assert_eq!(extract_total("Total: 1,234.56"), None);
        assert_eq!(extract_total("Total45.00"), None);
        assert_eq!(extract_total(""), None);
    }
}
