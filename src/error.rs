//! Error types shared across the crate.
//!
//! - [`RegistryError`] - malformed platform definitions, fatal at startup
//! - [`FetchError`] - transport failures talking to a marketplace
//! - [`QueryError`] - precondition violations and hard failures of a call

use crate::path::PathError;
use crate::registry::EndpointKind;
use thiserror::Error;

/// Platform definitions that cannot be loaded or fail validation.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read platform definitions from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse platform definitions: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    #[error("Platform {platform} has an invalid base URL `{url}`")]
    InvalidUrl { platform: String, url: String },

    #[error("Platform {platform} does not define the {endpoint} endpoint")]
    MissingEndpoint {
        platform: String,
        endpoint: EndpointKind,
    },

    #[error("Endpoint {endpoint} of {platform} has no {{id}} placeholder in `{template}`")]
    MissingPlaceholder {
        platform: String,
        endpoint: EndpointKind,
        template: String,
    },

    #[error("Endpoint {endpoint} of {platform} declares field `{field}` with an invalid path: {source}")]
    InvalidPath {
        platform: String,
        endpoint: EndpointKind,
        field: String,
        source: PathError,
    },
}

/// Failure to obtain a response from a marketplace.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {source}")]
    RequestFailed {
        #[from]
        source: reqwest::Error,
    },

    #[error("Response from {url} is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        source: serde_json::Error,
    },
}

/// Errors returned to the caller of a query operation.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Expected identifier for {platform} to be a number or string, got {found}")]
    InvalidIdentifier { platform: String, found: String },

    #[error("Unknown date time string format `{value}` received from {platform}")]
    UnrecognizedTimestamp { platform: String, value: String },

    #[error("Querying {endpoint} failed: {message}")]
    Endpoint {
        endpoint: EndpointKind,
        message: String,
    },
}
