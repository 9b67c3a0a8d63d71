//! Small string helpers for logging and display.

use crate::models::ArticleRecord;
use itertools::Itertools;

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to the previous
/// char boundary) with an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```
/// use qiita_search::utils::truncate_for_log;
///
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(15), 10), "aaaaaaaaaa…(+5 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Tags as a single comma-separated line.
pub fn join_tags(record: &ArticleRecord) -> String {
    record.tags.iter().join(", ")
}

/// Multi-line plain-text rendering of one record, prefixed with its position.
pub fn format_record(index: usize, record: &ArticleRecord) -> String {
    format!(
        "Contents: {index}\n{}\n{}\n{}\n{}\n",
        record.title,
        record.url,
        join_tags(record),
        record.snippet
    )
}
