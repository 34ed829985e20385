//! Date normalization utilities
//!
//! The engine and storage layer only ever see canonical `YYYY-MM-DD`
//! strings; anything else is rejected before it reaches them.

use chrono::NaiveDate;

/// Normalize any date input to a canonical `YYYY-MM-DD` string.
///
/// Accepts already-canonical dates, ISO datetime strings (the date part is
/// kept), and RFC 3339 timestamps. Returns `None` for empty or unparseable
/// input.
pub fn normalize_date_only(value: &str) -> Option<String> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }
    // Fast path: "YYYY-MM-DD" or "YYYY-MM-DDT..." prefix
    if let Some(head) = raw.get(..10) {
        if NaiveDate::parse_from_str(head, "%Y-%m-%d").is_ok()
            && (raw.len() == 10 || raw.as_bytes()[10] == b'T')
        {
            return Some(head.to_string());
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Parse a canonical (or datetime-prefixed) date string into a `NaiveDate`.
///
/// Used by the ranking engine to order task history; tasks whose date does
/// not parse are skipped there.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let normalized = normalize_date_only(value)?;
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
}
