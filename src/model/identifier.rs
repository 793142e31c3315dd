use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::QueryError;

/// Identifier of a resource on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Numeric(u64),
    Slug(String),
}

impl ResourceId {
    /// Parses command line input: all digits is numeric, anything else a slug.
    pub fn parse(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(id) if !s.starts_with('+') => ResourceId::Numeric(id),
            _ => ResourceId::Slug(s.to_string()),
        }
    }

    /// Returns true for identifiers a query skips: an empty slug or zero.
    pub fn is_empty(&self) -> bool {
        match self {
            ResourceId::Numeric(id) => *id == 0,
            ResourceId::Slug(slug) => slug.is_empty(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Numeric(id) => write!(f, "{}", id),
            ResourceId::Slug(slug) => f.write_str(slug),
        }
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        ResourceId::Numeric(id)
    }
}

impl From<&str> for ResourceId {
    fn from(slug: &str) -> Self {
        ResourceId::Slug(slug.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(slug: String) -> Self {
        ResourceId::Slug(slug)
    }
}

/// Platform name to resource identifier, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMap {
    entries: IndexMap<String, ResourceId>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the identifier for `platform`.
    ///
    /// A replaced entry keeps its position.
    pub fn insert(&mut self, platform: impl Into<String>, id: impl Into<ResourceId>) {
        self.entries.insert(platform.into(), id.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, platform: impl Into<String>, id: impl Into<ResourceId>) -> Self {
        self.insert(platform, id);
        self
    }

    /// Builds a map from a JSON object such as `{"spigot": 83767}`.
    ///
    /// Values must be non-negative integers or strings; `null` entries are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidIdentifier`] for any other value, or if
    /// `value` isn't an object.
    pub fn from_json(value: &Value) -> Result<Self, QueryError> {
        let object = value
            .as_object()
            .ok_or_else(|| QueryError::InvalidIdentifier {
                platform: "<root>".to_string(),
                found: json_type_name(value).to_string(),
            })?;

        let mut map = Self::new();
        for (platform, id) in object {
            let id = match id {
                Value::Null => continue,
                Value::String(slug) => ResourceId::Slug(slug.clone()),
                Value::Number(number) => match number.as_u64() {
                    Some(id) => ResourceId::Numeric(id),
                    None => {
                        return Err(QueryError::InvalidIdentifier {
                            platform: platform.clone(),
                            found: format!("number {}", number),
                        })
                    }
                },
                other => {
                    return Err(QueryError::InvalidIdentifier {
                        platform: platform.clone(),
                        found: json_type_name(other).to_string(),
                    })
                }
            };
            map.insert(platform.clone(), id);
        }
        Ok(map)
    }

    pub fn get(&self, platform: &str) -> Option<&ResourceId> {
        self.entries.get(platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceId)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>, I: Into<ResourceId>> FromIterator<(P, I)> for IdentifierMap {
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (platform, id) in iter {
            map.insert(platform, id);
        }
        map
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_resource_id() {
        assert_eq!(ResourceId::parse("83767"), ResourceId::Numeric(83767));
        assert_eq!(
            ResourceId::parse("WiIIiam278/HuskHomes"),
            ResourceId::Slug("WiIIiam278/HuskHomes".to_string())
        );
        assert_eq!(ResourceId::parse("+12"), ResourceId::Slug("+12".to_string()));
        assert_eq!(ResourceId::parse("huskhomes"), ResourceId::from("huskhomes"));
    }

    #[test]
    fn test_empty_ids() {
        assert!(ResourceId::Numeric(0).is_empty());
        assert!(ResourceId::from("").is_empty());
        assert!(!ResourceId::from(1u64).is_empty());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut ids = IdentifierMap::new()
            .with("spigot", 1u64)
            .with("modrinth", "husktowns")
            .with("github", "owner/repo");
        ids.insert("spigot", 2u64);

        let order: Vec<&str> = ids.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["spigot", "modrinth", "github"]);
        assert_eq!(ids.get("spigot"), Some(&ResourceId::Numeric(2)));
    }

    #[test]
    fn test_from_json() {
        let ids = IdentifierMap::from_json(&json!({
            "spigot": 83767,
            "github": "WiIIiam278/HuskHomes",
            "hangar": null
        }))
        .unwrap();

        assert_eq!(ids.len(), 2);
        assert_eq!(ids.get("spigot"), Some(&ResourceId::Numeric(83767)));
        assert_eq!(ids.get("hangar"), None);
    }

    #[test]
    fn test_from_json_rejects_other_types() {
        let invalid = [
            json!({"spigot": true}),
            json!({"spigot": [1]}),
            json!({"spigot": -4}),
            json!({"spigot": 1.5}),
        ];
        for bad in invalid {
            match IdentifierMap::from_json(&bad) {
                Err(QueryError::InvalidIdentifier { platform, .. }) => {
                    assert_eq!(platform, "spigot")
                }
                other => panic!("expected invalid identifier, got {:?}", other),
            }
        }

        assert!(matches!(
            IdentifierMap::from_json(&json!([1, 2])),
            Err(QueryError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_serializes_untagged() {
        assert_eq!(serde_json::to_value(ResourceId::Numeric(5)).unwrap(), json!(5));
        assert_eq!(serde_json::to_value(ResourceId::from("a/b")).unwrap(), json!("a/b"));
    }
}
