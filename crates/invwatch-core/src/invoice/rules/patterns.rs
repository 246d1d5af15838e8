//! Regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "Total" label followed by whitespace/colons and a two-decimal amount.
    // ASCII digits only; no currency symbols, no thousands separators.
    pub static ref TOTAL_PATTERN: Regex = Regex::new(
        r"(?i)Total[\s:]+([0-9]+\.[0-9]{2})"
    ).unwrap();
}
