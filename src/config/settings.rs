//! Application settings loading from config.toml
//!
//! Every key has a default, so a missing file or a partial file is fine; only a
//! file that exists but cannot be parsed is an error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::{debug, info};

/// Collection that holds the spare-part documents.
pub const DEFAULT_COLLECTION: &str = "repuestosMoto";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog and remote store behaviour
    pub catalog: CatalogSettings,
}

/// Tuning for the catalog's calls to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Name of the remote collection
    pub collection: String,
    /// Per-call timeout for remote operations, in milliseconds
    pub remote_timeout_ms: u64,
    /// Extra attempts made by `reload` after a failed fetch
    pub fetch_retries: u32,
    /// Delay before the first retry; doubles on every further attempt
    pub fetch_backoff_ms: u64,
    /// Stock at or below which a product is reported as running low
    pub low_stock_threshold: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            remote_timeout_ms: 10_000,
            fetch_retries: 2,
            fetch_backoff_ms: 250,
            low_stock_threshold: 2,
        }
    }
}

impl CatalogSettings {
    /// Remote call timeout as a `Duration`.
    #[must_use]
    pub const fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.fetch_backoff_ms.saturating_mul(factor))
    }
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns an error if the TOML is invalid.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `CONFIG_PATH` (default `./config.toml`), falling
/// back to defaults when that file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {path}");
        Ok(config)
    } else {
        info!("No configuration file at {path}, using defaults");
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let toml_str = r#"
            [catalog]
            collection = "pruebas"
            fetch_retries = 5
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.catalog.collection, "pruebas");
        assert_eq!(config.catalog.fetch_retries, 5);
        assert_eq!(config.catalog.remote_timeout_ms, 10_000);
        assert_eq!(config.catalog.low_stock_threshold, 2);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.catalog, CatalogSettings::default());
        assert_eq!(config.catalog.collection, DEFAULT_COLLECTION);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let result = parse_config("[catalog]\nfetch_retries = \"many\"");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_backoff_doubles() {
        let settings = CatalogSettings {
            fetch_backoff_ms: 100,
            ..CatalogSettings::default()
        };
        assert_eq!(settings.backoff(1), Duration::from_millis(100));
        assert_eq!(settings.backoff(2), Duration::from_millis(200));
        assert_eq!(settings.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
