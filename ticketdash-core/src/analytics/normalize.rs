//! Label normalization shared by the aggregator and the filters.

use crate::types::UNCATEGORIZED;

/// Canonical grouping key for a client cell.
///
/// Blank or absent values map to [`UNCATEGORIZED`]. Otherwise the value is
/// trimmed, uppercased and cut to its first whitespace-delimited word, so
/// `"Acme Corp"` and `"ACME LTDA"` both group under `"ACME"`. Distinct
/// clients sharing a first word are merged.
pub fn normalize_client(value: Option<&str>) -> String {
    value
        .and_then(|v| v.split_whitespace().next())
        .map(str::to_uppercase)
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

/// Uppercase-trimmed category label, [`UNCATEGORIZED`] when blank.
///
/// Used for status and work-item type.
pub fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        trimmed.to_uppercase()
    }
}

/// Split a tag cell on commas; each tag trimmed and uppercased, blanks dropped.
///
/// Duplicates are kept: each occurrence counts.
pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|tag| tag.trim().to_uppercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}
