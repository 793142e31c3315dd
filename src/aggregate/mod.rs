//! Reducers that fold per-platform fields into summary values.
//!
//! Each aggregator takes the [`QueryResult`](crate::model::QueryResult) of one
//! endpoint kind, rewrites the per-platform fields to their coerced types and
//! appends the summary:
//!
//! | Endpoint | Summary |
//! |----------|---------|
//! | downloads | `total_downloads`, the sum |
//! | rating | `average_rating` weighted by count, `rating_count` |
//! | price | `lowest_price` above zero and its currency |
//! | latest_version | the version with the newest `published` timestamp |
//!
//! Coercion never fails: missing or non-numeric values become zero. The one
//! exception is a `published` string in an unknown date format.

mod downloads;
mod latest_version;
mod price;
mod rating;
mod summary;

pub use downloads::DownloadsReport;
pub use latest_version::{parse_timestamp, LatestVersionReport};
pub use price::{PriceReport, DEFAULT_CURRENCY};
pub use rating::RatingReport;
pub use summary::Summary;

use serde_json::Value;

/// Reads a float from a JSON number or the numeric prefix of a string.
pub(crate) fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric_prefix(s, true)?.parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Reads a non-negative integer; fractions are truncated, negatives give 0.
pub(crate) fn coerce_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
        Value::String(s) => {
            let prefix = numeric_prefix(s, false)?;
            match prefix.strip_prefix('-') {
                Some(_) => Some(0),
                None => prefix.trim_start_matches('+').parse::<u64>().ok(),
            }
        }
        _ => None,
    }
}

/// Returns the longest leading number in `s`, ignoring leading whitespace.
///
/// `"1200 downloads"` gives `"1200"`. With `fraction` set, a decimal part
/// and exponent are accepted too (`"4.5e1 stars"` gives `"4.5e1"`).
fn numeric_prefix(s: &str, fraction: bool) -> Option<&str> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - digits_start;

    if fraction {
        if bytes.get(end) == Some(&b'.') {
            let fraction_start = end + 1;
            let mut cursor = fraction_start;
            while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
                cursor += 1;
            }
            digits += cursor - fraction_start;
            if digits > 0 {
                end = cursor;
            }
        }

        if digits > 0 && matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut cursor = end + 1;
            if matches!(bytes.get(cursor), Some(b'+' | b'-')) {
                cursor += 1;
            }
            let exponent_start = cursor;
            while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
                cursor += 1;
            }
            if cursor > exponent_start {
                end = cursor;
            }
        }
    }

    (digits > 0).then(|| &s[..end])
}
