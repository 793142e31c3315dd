//! Path expressions over arbitrary JSON response bodies.
//!
//! Marketplace APIs answer with very different shapes: a single object for
//! one resource, or arrays of per-version and per-file statistics. A path
//! expression locates a field in either shape:
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `rating.average` | nested object keys |
//! | `versions[0].name` | index into an array |
//! | `assets[].download_count` | sum the tail over every array element |
//!
//! When the value being resolved is itself an array, the whole expression is
//! applied to each element and the numeric results are summed, unless the
//! expression starts with an explicit index such as `[0].version_number`.
//!
//! # Example
//!
//! ```
//! use mineget::path::resolve;
//! use serde_json::json;
//!
//! let body = json!({"items": [{"count": 2}, {"count": 3}]});
//! assert_eq!(resolve(&body, "items[].count"), Some(json!(5)));
//! ```

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Reasons a path expression fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty key at position {position} in `{expr}`")]
    EmptyKey { expr: String, position: usize },

    #[error("unterminated `[` in `{expr}`")]
    UnterminatedBracket { expr: String },

    #[error("invalid index `{index}` in `{expr}`")]
    InvalidIndex { expr: String, index: String },

    #[error("unexpected `{found}` after `]` in `{expr}`")]
    UnexpectedAfterBracket { expr: String, found: char },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
    Wildcard,
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    source: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parses an expression such as `files[].downloads` or `result[0].name`.
    ///
    /// The empty expression is valid and resolves to the value itself.
    pub fn parse(expr: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut key = String::new();
        let mut chars = expr.char_indices();
        // Set right after `]`, where only `.`, `[` or the end may follow.
        let mut after_bracket = false;

        while let Some((position, c)) = chars.next() {
            match c {
                '.' => {
                    if after_bracket {
                        after_bracket = false;
                        continue;
                    }
                    if key.is_empty() {
                        return Err(PathError::EmptyKey {
                            expr: expr.to_string(),
                            position,
                        });
                    }
                    segments.push(Segment::Key(std::mem::take(&mut key)));
                }
                '[' => {
                    after_bracket = false;
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }

                    let mut index = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        index.push(c);
                    }
                    if !closed {
                        return Err(PathError::UnterminatedBracket {
                            expr: expr.to_string(),
                        });
                    }

                    if index.is_empty() {
                        segments.push(Segment::Wildcard);
                    } else {
                        let parsed = index.trim().parse::<usize>().map_err(|_| {
                            PathError::InvalidIndex {
                                expr: expr.to_string(),
                                index: index.clone(),
                            }
                        })?;
                        segments.push(Segment::Index(parsed));
                    }
                    after_bracket = true;
                }
                other => {
                    if after_bracket {
                        return Err(PathError::UnexpectedAfterBracket {
                            expr: expr.to_string(),
                            found: other,
                        });
                    }
                    key.push(other);
                }
            }
        }

        if !key.is_empty() {
            segments.push(Segment::Key(key));
        } else if expr.ends_with('.') && !expr.ends_with("].") {
            return Err(PathError::EmptyKey {
                expr: expr.to_string(),
                position: expr.len(),
            });
        }

        Ok(Self {
            source: expr.to_string(),
            segments,
        })
    }

    /// Returns the expression as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the expression contains a `[]` wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.segments.contains(&Segment::Wildcard)
    }

    /// Resolves this expression against `value`.
    ///
    /// Returns `None` when a segment is absent or the shape doesn't match.
    pub fn resolve(&self, value: &Value) -> Option<Value> {
        resolve_segments(value, &self.segments)
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parses `expr` and resolves it against `value`.
///
/// Invalid expressions resolve to `None`; the registry rejects them up front.
pub fn resolve(value: &Value, expr: &str) -> Option<Value> {
    PathExpr::parse(expr).ok()?.resolve(value)
}

fn resolve_segments(value: &Value, segments: &[Segment]) -> Option<Value> {
    if let Value::Array(items) = value {
        if !matches!(
            segments.first(),
            Some(Segment::Index(_)) | Some(Segment::Wildcard)
        ) {
            return Some(sum(
                items.iter().map(|item| resolve_segments(item, segments)),
            ));
        }
    }

    if let Some(split) = segments.iter().position(|s| *s == Segment::Wildcard) {
        let (head, tail) = (&segments[..split], &segments[split + 1..]);
        return match traverse(value, head) {
            None | Some(Value::Null) => Some(Value::from(0)),
            Some(Value::Array(items)) => Some(sum(
                items.iter().map(|item| resolve_segments(item, tail)),
            )),
            Some(_) => None,
        };
    }

    traverse(value, segments).cloned()
}

fn traverse<'a>(value: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments.iter().try_fold(value, |current, segment| match segment {
        Segment::Key(key) => current.as_object()?.get(key),
        Segment::Index(index) => current.as_array()?.get(*index),
        Segment::Wildcard => None,
    })
}

/// Sums the numeric values, ignoring everything else.
///
/// The total stays an integer while every addend is one.
fn sum(values: impl Iterator<Item = Option<Value>>) -> Value {
    let mut integer: Option<i64> = Some(0);
    let mut float = 0.0_f64;

    for value in values.flatten() {
        let Value::Number(number) = value else {
            continue;
        };
        integer = match (integer, number.as_i64()) {
            (Some(total), Some(n)) => total.checked_add(n),
            _ => None,
        };
        float += number.as_f64().unwrap_or(0.0);
    }

    match integer {
        Some(total) => Value::from(total),
        None => Value::from(float),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_path() {
        let value = json!({"a": {"b": 5}});
        assert_eq!(resolve(&value, "a.b"), Some(json!(5)));
    }

    #[test]
    fn test_missing_segment() {
        let value = json!({"a": {"b": 5}});
        assert_eq!(resolve(&value, "a.c"), None);
        assert_eq!(resolve(&value, "a.b.c"), None);
        assert_eq!(resolve(&value, "x"), None);
    }

    #[test]
    fn test_wildcard_sum() {
        let value = json!({"items": [{"count": 2}, {"count": 3}]});
        assert_eq!(resolve(&value, "items[].count"), Some(json!(5)));
    }

    #[test]
    fn test_wildcard_ignores_non_numeric() {
        let value = json!({"items": [{"count": 2}, {"count": "n/a"}, {}, {"count": 4}]});
        assert_eq!(resolve(&value, "items[].count"), Some(json!(6)));
    }

    #[test]
    fn test_wildcard_missing_head_is_zero() {
        let value = json!({"other": []});
        assert_eq!(resolve(&value, "items[].count"), Some(json!(0)));
    }

    #[test]
    fn test_wildcard_head_not_array() {
        let value = json!({"items": {"count": 1}});
        assert_eq!(resolve(&value, "items[].count"), None);
    }

    #[test]
    fn test_root_array_sums_each_element() {
        // GitHub releases: one object per release, each with assets.
        let value = json!([
            {"assets": [{"download_count": 10}, {"download_count": 5}]},
            {"assets": [{"download_count": 1}]},
            {"assets": []}
        ]);
        assert_eq!(resolve(&value, "assets[].download_count"), Some(json!(16)));
    }

    #[test]
    fn test_root_array_plain_path() {
        let value = json!([{"downloads": 7}, {"downloads": 3}]);
        assert_eq!(resolve(&value, "downloads"), Some(json!(10)));
    }

    #[test]
    fn test_root_array_non_numeric_sums_to_zero() {
        let value = json!([{"name": "a"}, {"name": "b"}]);
        assert_eq!(resolve(&value, "name"), Some(json!(0)));
    }

    #[test]
    fn test_leading_index_selects_element() {
        let value = json!([
            {"version_number": "2.0.0", "date_published": "2024-01-02T00:00:00Z"},
            {"version_number": "1.0.0"}
        ]);
        assert_eq!(resolve(&value, "[0].version_number"), Some(json!("2.0.0")));
        assert_eq!(resolve(&value, "[5].version_number"), None);
    }

    #[test]
    fn test_nested_index() {
        let value = json!({"result": [{"name": "1.4"}, {"name": "1.3"}]});
        assert_eq!(resolve(&value, "result[1].name"), Some(json!("1.3")));
    }

    #[test]
    fn test_float_sum() {
        let value = json!({"items": [{"v": 1}, {"v": 0.5}]});
        assert_eq!(resolve(&value, "items[].v"), Some(json!(1.5)));
    }

    #[test]
    fn test_nested_wildcards() {
        let value = json!({"versions": [
            {"files": [{"d": 1}, {"d": 2}]},
            {"files": [{"d": 3}]}
        ]});
        assert_eq!(resolve(&value, "versions[].files[].d"), Some(json!(6)));
    }

    #[test]
    fn test_empty_expression_is_identity() {
        let value = json!({"a": 1});
        assert_eq!(resolve(&value, ""), Some(json!({"a": 1})));
    }

    #[test]
    fn test_returns_non_scalar_values() {
        let value = json!({"rating": {"average": 4.5, "count": 12}});
        assert_eq!(
            resolve(&value, "rating"),
            Some(json!({"average": 4.5, "count": 12}))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            PathExpr::parse("a..b"),
            Err(PathError::EmptyKey { .. })
        ));
        assert!(matches!(
            PathExpr::parse("a."),
            Err(PathError::EmptyKey { .. })
        ));
        assert!(matches!(
            PathExpr::parse("items[.count"),
            Err(PathError::UnterminatedBracket { .. })
        ));
        assert!(matches!(
            PathExpr::parse("items[x].count"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            PathExpr::parse("items[]count"),
            Err(PathError::UnexpectedAfterBracket { .. })
        ));
    }

    #[test]
    fn test_parse_accepts_valid_forms() {
        for expr in ["a", "a.b.c", "a[]", "a[].b", "[0].b", "a[2][0]", "a[].b[].c"] {
            assert!(PathExpr::parse(expr).is_ok(), "{expr} should parse");
        }
        assert!(PathExpr::parse("a[].b").unwrap().has_wildcard());
        assert!(!PathExpr::parse("a[0].b").unwrap().has_wildcard());
    }

    #[test]
    fn test_invalid_expression_resolves_to_none() {
        let value = json!({"a": 1});
        assert_eq!(resolve(&value, "a..b"), None);
    }
}
