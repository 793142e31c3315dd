//! Configuration file handling.
//!
//! This module provides loading and saving of mineget configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/mineget/config.toml`
//! - macOS: `~/Library/Application Support/mineget/config.toml`
//! - Windows: `%APPDATA%\mineget\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! cache_ttl_secs = 600
//! request_timeout_secs = 30
//! user_agent = "mineget/0.1.0"
//! default_format = "table"
//! platforms_file = "/home/me/.config/mineget/platforms.toml"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CACHE_TTL_SECS;

/// Application configuration.
///
/// This struct represents all configurable options for mineget.
/// It can be loaded from a TOML file or created with default values.
///
/// # Example
///
/// ```no_run
/// use mineget::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Cache TTL: {} seconds", config.cache_ttl_secs);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long to keep successful API responses, in seconds.
    ///
    /// Default: 600 (10 minutes)
    pub cache_ttl_secs: u64,

    /// Timeout for a single HTTP request, in seconds.
    ///
    /// Default: 30
    pub request_timeout_secs: u64,

    /// User agent sent with every request.
    ///
    /// Default: "mineget/<version>"
    pub user_agent: String,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Extra platform definitions, merged over the built-in ones.
    ///
    /// Default: none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            request_timeout_secs: 30,
            user_agent: format!("mineget/{}", env!("CARGO_PKG_VERSION")),
            default_format: "table".to_string(),
            platforms_file: None,
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults if it's absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use mineget::Config;
    ///
    /// let path = Config::config_path();
    /// println!("Config file: {}", path.display());
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mineget")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.cache_ttl_secs, 600);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.default_format, "table");
        assert!(config.user_agent.starts_with("mineget/"));
        assert!(config.platforms_file.is_none());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cache_ttl_secs = 60\nplatforms_file = \"extra.toml\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.platforms_file, Some(PathBuf::from("extra.toml")));
        assert_eq!(config.default_format, "table");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cache_ttl_secs = \"ten\"").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            cache_ttl_secs: 120,
            default_format: "json".to_string(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_generate_default_config() {
        let text = Config::generate_default_config();
        assert!(text.contains("cache_ttl_secs = 600"));
        assert!(!text.contains("platforms_file"));
    }
}
