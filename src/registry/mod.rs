//! Marketplace platform definitions.
//!
//! The registry maps a platform name to its base URL and, for each
//! [`EndpointKind`], a path template plus the fields to extract from the
//! response. Built-in definitions ship inside the binary; a user file can add
//! platforms or replace built-in ones (see [`Config::platforms_file`]).
//!
//! Definitions are validated when the registry is built, so a malformed entry
//! fails before any query runs.
//!
//! # Definition Format
//!
//! ```toml
//! [platforms.spigot]
//! url = "https://api.spiget.org/v2/"
//!
//! [platforms.spigot.endpoints.rating]
//! endpoint = "resources/{id}"
//! returns = { average = "rating.average", count = "rating.count" }
//! ```
//!
//! [`Config::platforms_file`]: crate::config::Config::platforms_file

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::RegistryError;
use crate::model::ResourceId;
use crate::path::PathExpr;

const BUILTIN_PLATFORMS: &str = include_str!("platforms.toml");

/// Placeholder replaced by the resource identifier in endpoint templates.
pub const ID_PLACEHOLDER: &str = "{id}";

/// The metric categories every platform must answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    Downloads,
    Rating,
    Price,
    LatestVersion,
    Name,
}

impl EndpointKind {
    pub const ALL: [EndpointKind; 5] = [
        EndpointKind::Downloads,
        EndpointKind::Rating,
        EndpointKind::Price,
        EndpointKind::LatestVersion,
        EndpointKind::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Downloads => "downloads",
            EndpointKind::Rating => "rating",
            EndpointKind::Price => "price",
            EndpointKind::LatestVersion => "latest_version",
            EndpointKind::Name => "name",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EndpointKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown endpoint: {}", s))
    }
}

/// One endpoint of a platform: where to fetch and what to extract.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    /// Path relative to the platform URL, containing `{id}`.
    pub endpoint: String,
    /// Output field name to source path, in declaration order.
    pub returns: Vec<(String, PathExpr)>,
}

/// A marketplace and all of its endpoints.
#[derive(Debug, Clone)]
pub struct PlatformSpec {
    pub name: String,
    pub url: String,
    pub endpoints: BTreeMap<EndpointKind, EndpointSpec>,
}

impl PlatformSpec {
    /// Builds the request URL for `kind` with `id` substituted.
    ///
    /// Returns `None` if the platform doesn't define the endpoint.
    pub fn url_for(&self, kind: EndpointKind, id: &ResourceId) -> Option<String> {
        let endpoint = self.endpoints.get(&kind)?;
        let template = format!("{}{}", self.url, endpoint.endpoint);
        Some(template.replace(ID_PLACEHOLDER, &id.to_string()))
    }
}

#[derive(Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    platforms: BTreeMap<String, PlatformDef>,
}

#[derive(Deserialize)]
struct PlatformDef {
    url: String,
    #[serde(default)]
    endpoints: BTreeMap<String, EndpointDef>,
}

#[derive(Deserialize)]
struct EndpointDef {
    endpoint: String,
    #[serde(default)]
    returns: IndexMap<String, String>,
}

/// Read-only table of known platforms.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    platforms: BTreeMap<String, PlatformSpec>,
}

impl Registry {
    /// Loads the definitions compiled into the binary.
    ///
    /// # Example
    ///
    /// ```
    /// use mineget::registry::{EndpointKind, Registry};
    ///
    /// let registry = Registry::builtin().unwrap();
    /// assert!(registry.lookup_endpoint("spigot", EndpointKind::Downloads).is_some());
    /// ```
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUILTIN_PLATFORMS)
    }

    /// Parses and validates definitions from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RegistryError> {
        let file: DefinitionFile = toml::from_str(content)?;

        let mut platforms = BTreeMap::new();
        for (name, def) in file.platforms {
            let spec = validate_platform(&name, def)?;
            platforms.insert(name, spec);
        }

        debug!("Loaded {} platform definitions", platforms.len());
        Ok(Self { platforms })
    }

    /// Loads definitions from a TOML file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Adds an already-built platform without validating it.
    #[cfg(test)]
    pub(crate) fn with_platform(mut self, platform: PlatformSpec) -> Self {
        self.platforms.insert(platform.name.clone(), platform);
        self
    }

    /// Adds the platforms of `other`, replacing any with the same name.
    pub fn merge(mut self, other: Registry) -> Self {
        self.platforms.extend(other.platforms);
        self
    }

    pub fn lookup(&self, platform: &str) -> Option<&PlatformSpec> {
        self.platforms.get(platform)
    }

    pub fn lookup_endpoint(&self, platform: &str, kind: EndpointKind) -> Option<&EndpointSpec> {
        self.lookup(platform)?.endpoints.get(&kind)
    }

    /// Iterates platforms in name order.
    pub fn platforms(&self) -> impl Iterator<Item = &PlatformSpec> {
        self.platforms.values()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

fn validate_platform(name: &str, def: PlatformDef) -> Result<PlatformSpec, RegistryError> {
    let url_ok = reqwest::Url::parse(&def.url)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !url_ok {
        return Err(RegistryError::InvalidUrl {
            platform: name.to_string(),
            url: def.url,
        });
    }

    let mut raw: BTreeMap<EndpointKind, EndpointDef> = BTreeMap::new();
    for (endpoint_name, endpoint) in def.endpoints {
        match endpoint_name.parse::<EndpointKind>() {
            Ok(kind) => {
                raw.insert(kind, endpoint);
            }
            Err(_) => debug!("Ignoring unknown endpoint {} of {}", endpoint_name, name),
        }
    }

    let mut endpoints = BTreeMap::new();
    for kind in EndpointKind::ALL {
        let def = raw.remove(&kind).ok_or_else(|| RegistryError::MissingEndpoint {
            platform: name.to_string(),
            endpoint: kind,
        })?;

        if !def.endpoint.contains(ID_PLACEHOLDER) {
            return Err(RegistryError::MissingPlaceholder {
                platform: name.to_string(),
                endpoint: kind,
                template: def.endpoint,
            });
        }

        let mut returns = Vec::with_capacity(def.returns.len());
        for (field, source_path) in def.returns {
            let expr =
                PathExpr::parse(&source_path).map_err(|source| RegistryError::InvalidPath {
                    platform: name.to_string(),
                    endpoint: kind,
                    field: field.clone(),
                    source,
                })?;
            returns.push((field, expr));
        }

        endpoints.insert(
            kind,
            EndpointSpec {
                endpoint: def.endpoint,
                returns,
            },
        );
    }

    Ok(PlatformSpec {
        name: name.to_string(),
        url: def.url,
        endpoints,
    })
}
