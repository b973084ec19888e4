//! Repository configuration
//!
//! Loaded from `ORDERVAULT_*` environment variables or a TOML document with
//! the `config` crate; every field has a default except the DSN.

#![allow(clippy::result_large_err)]

use config::{Config, ConfigError, Environment, File, FileFormat};
use ordervault_core::core_types::Sensitive;
use ordervault_core::{ExError, ExErrorKind, Result};
use ordervault_store::{SampleOrder, StoreOptions};
use serde::Deserialize;
use std::time::Duration;

const ENV_PREFIX: &str = "ORDERVAULT";

/// Which persisted orders pre-populate the cache at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmStart {
    /// The most recently created orders
    #[default]
    Recent,
    /// Any orders, in whatever order the database returns them
    Any,
    /// Start with an empty cache
    Disabled,
}

/// Settings needed to open an [`crate::OrderRepository`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Store location: a file path or `sqlite://` URL
    pub dsn: Sensitive<String>,
    /// Maximum number of cached aggregates
    pub cache_capacity: usize,
    pub busy_timeout_ms: u64,
    pub warm_start: WarmStart,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            dsn: Sensitive::default(),
            cache_capacity: 10,
            busy_timeout_ms: 5_000,
            warm_start: WarmStart::Recent,
        }
    }
}

impl RepositoryConfig {
    /// Defaults with the given DSN
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Sensitive::new(dsn.into()),
            ..Self::default()
        }
    }

    /// Load from `ORDERVAULT_DSN`, `ORDERVAULT_CACHE_CAPACITY`,
    /// `ORDERVAULT_BUSY_TIMEOUT_MS` and `ORDERVAULT_WARM_START`
    ///
    /// # Errors
    ///
    /// `Configuration` if a variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_env_prefix(ENV_PREFIX)
    }

    fn from_env_prefix(prefix: &str) -> Result<Self> {
        Config::builder()
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)
    }

    /// Load from a TOML document
    ///
    /// # Errors
    ///
    /// `Configuration` if the document is malformed or a value has the
    /// wrong type.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)
    }

    /// Check the settings can open a repository
    ///
    /// # Errors
    ///
    /// `Configuration` for an empty DSN or a zero cache capacity.
    pub fn validate(&self) -> Result<()> {
        if self.dsn.expose().trim().is_empty() {
            return Err(ExError::new(ExErrorKind::Configuration)
                .with_op("validate_config")
                .with_message("dsn must not be empty"));
        }
        if self.cache_capacity == 0 {
            return Err(ExError::new(ExErrorKind::Configuration)
                .with_op("validate_config")
                .with_message("cache_capacity must be at least 1"));
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Store settings derived from this configuration
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            busy_timeout: self.busy_timeout(),
            sample_order: match self.warm_start {
                WarmStart::Any => SampleOrder::Unordered,
                WarmStart::Recent | WarmStart::Disabled => SampleOrder::MostRecent,
            },
        }
    }
}

fn config_error(err: ConfigError) -> ExError {
    ExError::new(ExErrorKind::Configuration)
        .with_op("load_config")
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RepositoryConfig::new("orders.db");
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.warm_start, WarmStart::Recent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str() {
        let config = RepositoryConfig::from_toml_str(
            r#"
            dsn = "sqlite:///var/lib/ordervault/orders.db"
            cache_capacity = 250
            warm_start = "any"
            "#,
        )
        .unwrap();

        assert_eq!(config.dsn.expose(), "sqlite:///var/lib/ordervault/orders.db");
        assert_eq!(config.cache_capacity, 250);
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert_eq!(config.warm_start, WarmStart::Any);
        assert_eq!(config.store_options().sample_order, SampleOrder::Unordered);
    }

    #[test]
    fn test_from_toml_rejects_wrong_type() {
        let err = RepositoryConfig::from_toml_str("cache_capacity = \"lots\"").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Configuration);
    }

    #[test]
    fn test_from_env_prefix() {
        std::env::set_var("OVTESTCFG_DSN", "/tmp/env-orders.db");
        std::env::set_var("OVTESTCFG_CACHE_CAPACITY", "3");
        std::env::set_var("OVTESTCFG_WARM_START", "disabled");

        let config = RepositoryConfig::from_env_prefix("OVTESTCFG").unwrap();

        assert_eq!(config.dsn.expose(), "/tmp/env-orders.db");
        assert_eq!(config.cache_capacity, 3);
        assert_eq!(config.warm_start, WarmStart::Disabled);
    }

    #[test]
    fn test_validate_rejects_empty_dsn_and_zero_capacity() {
        let empty = RepositoryConfig::default();
        assert_eq!(empty.validate().unwrap_err().kind(), ExErrorKind::Configuration);

        let zero = RepositoryConfig {
            cache_capacity: 0,
            ..RepositoryConfig::new("orders.db")
        };
        assert_eq!(zero.validate().unwrap_err().kind(), ExErrorKind::Configuration);
    }

    #[test]
    fn test_debug_redacts_dsn() {
        let config = RepositoryConfig::new("file:orders.db?key=hunter2");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
