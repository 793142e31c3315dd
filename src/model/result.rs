use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields extracted for one platform, in declaration order.
pub type Fields = Map<String, Value>;

/// Outcome flag of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Per-platform results keyed by platform name, in query order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Endpoints {
    entries: IndexMap<String, Fields>,
}

impl Endpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the fields for `platform`, replacing an earlier entry in place.
    pub fn insert(&mut self, platform: impl Into<String>, fields: Fields) {
        self.entries.insert(platform.into(), fields);
    }

    pub fn get(&self, platform: &str) -> Option<&Fields> {
        self.entries.get(platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fields)> {
        self.entries
            .iter()
            .map(|(name, fields)| (name.as_str(), fields))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Fields)> {
        self.entries
            .iter_mut()
            .map(|(name, fields)| (name.as_str(), fields))
    }

    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Result of querying one endpoint kind across platforms.
///
/// Serializes as `{"status": ..., "message"?: ..., "endpoints": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub endpoints: Endpoints,
}

impl QueryResult {
    /// An empty, successful result.
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            message: None,
            endpoints: Endpoints::new(),
        }
    }

    /// Turns this into a terminal error, dropping any partial endpoints.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = Status::Error;
        self.message = Some(message.into());
        self.endpoints.clear();
    }

    /// Marks the result as failed while keeping the endpoints gathered so far.
    ///
    /// Messages from several failures are joined with `"; "`.
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.status = Status::Error;
        self.message = Some(match self.message.take() {
            Some(existing) => format!("{}; {}", existing, message),
            None => message,
        });
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

impl Default for QueryResult {
    fn default() -> Self {
        Self::success()
    }
}
