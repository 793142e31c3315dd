use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::QueryError;
use crate::model::QueryResult;

/// Latest version per platform and the most recently published one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestVersionReport {
    #[serde(flatten)]
    pub result: QueryResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    /// Publication time of `latest_version` in Unix milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version_published: Option<i64>,
}

impl LatestVersionReport {
    /// Normalizes every `published` field and picks the newest version.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnrecognizedTimestamp`] if any platform reports a
    /// `published` string that is neither a Unix epoch nor an ISO-8601 date.
    pub fn from_result(mut result: QueryResult) -> Result<Self, QueryError> {
        let mut latest: Option<(String, i64)> = None;

        for (platform, fields) in result.endpoints.iter_mut() {
            let published = parse_timestamp(platform, fields.get("published"))?;
            fields.insert("published".to_string(), Value::from(published));

            let Some(version) = fields.get("version").and_then(version_string) else {
                continue;
            };
            let newest = latest.as_ref().map_or(0, |(_, at)| *at);
            if published > newest {
                latest = Some((version, published));
            }
        }

        let (latest_version, latest_version_published) = match latest {
            Some((version, published)) => (Some(version), Some(published)),
            None => (None, None),
        };

        Ok(Self {
            result,
            latest_version,
            latest_version_published,
        })
    }
}

fn version_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Below this, an epoch is in seconds rather than milliseconds.
///
/// Second-based epochs stay under it until the year 5138 and millisecond ones
/// have been above it since 1973.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Converts a `published` value to Unix milliseconds.
///
/// - numbers are epochs, truncated to an integer
/// - strings of 6 to 13 digits are epochs
/// - epochs below 10^11 are seconds and get scaled to
///   milliseconds
/// - ISO-8601 dates and date-times are converted, with a missing zone read
///   as UTC
/// - absent, null and empty values give 0
///
/// # Example
///
/// ```
/// use mineget::aggregate::parse_timestamp;
/// use serde_json::json;
///
/// let at = parse_timestamp("modrinth", Some(&json!("2024-01-02T00:00:00Z"))).unwrap();
/// assert_eq!(at, 1_704_153_600_000);
/// assert_eq!(parse_timestamp("spigot", Some(&json!(1_704_153_600))).unwrap(), at);
/// assert!(parse_timestamp("modrinth", Some(&json!("last tuesday"))).is_err());
/// ```
pub fn parse_timestamp(platform: &str, value: Option<&Value>) -> Result<i64, QueryError> {
    let text = match value {
        None | Some(Value::Null) => return Ok(0),
        Some(Value::Number(n)) => {
            let epoch = n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(0);
            return Ok(epoch_millis(epoch));
        }
        Some(Value::String(s)) => s.trim(),
        Some(_) => return Ok(0),
    };

    if text.is_empty() {
        return Ok(0);
    }
    if (6..=13).contains(&text.len()) && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(epoch) = text.parse::<i64>() {
            return Ok(epoch_millis(epoch));
        }
    }

    parse_iso8601(text).ok_or_else(|| QueryError::UnrecognizedTimestamp {
        platform: platform.to_string(),
        value: text.to_string(),
    })
}

fn epoch_millis(epoch: i64) -> i64 {
    if epoch.abs() < MILLIS_THRESHOLD {
        epoch.saturating_mul(1000)
    } else {
        epoch
    }
}

const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_iso8601(text: &str) -> Option<i64> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.timestamp_millis());
    }
    for format in ZONED_FORMATS {
        if let Ok(at) = DateTime::parse_from_str(text, format) {
            return Some(at.timestamp_millis());
        }
    }

    let naive = text.strip_suffix(['Z', 'z']).unwrap_or(text);
    for format in NAIVE_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(at.and_utc().timestamp_millis());
        }
    }

    let date = match naive.len() {
        4 => naive
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        7 => NaiveDate::parse_from_str(&format!("{}-01", naive), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(naive, "%Y-%m-%d").ok(),
    }?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}
