//! Description extraction.

use crate::models::record::UNKNOWN_DESCRIPTION;

/// First line of the text, trimmed, or the unknown-invoice sentinel when
/// the text is empty or its first line is blank.
pub fn extract_description(text: &str) -> String {
    text.split('\n')
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or(UNKNOWN_DESCRIPTION)
        .to_string()
}
