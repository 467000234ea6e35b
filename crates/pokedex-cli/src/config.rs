//! RON configuration for the `pokedex` binary

use pokedex_ingest::IngestConfig;
use pokedex_source::SourceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Root configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Path of the catalog database
    pub database: String,
    /// Tracing filter, overrides the built-in fallback when set
    pub log_filter: Option<String>,
    /// Remote source connection
    pub source: SourceConfig,
    /// Ingestion limits
    pub ingest: IngestSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "pokedex.db".to_string(),
            log_filter: None,
            source: SourceConfig::default(),
            ingest: IngestSettings::default(),
        }
    }
}

/// Ingestion limits as written in the file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestSettings {
    pub move_limit: usize,
    pub group_limit: usize,
    pub min_key: u32,
    pub max_key: Option<u32>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        let defaults = IngestConfig::default();
        Self {
            move_limit: defaults.move_limit(),
            group_limit: defaults.group_limit(),
            min_key: defaults.min_key(),
            max_key: defaults.max_key(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::parse(&content)
    }

    /// Load a file if it exists, otherwise use defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::Validation("database path is empty".to_string()));
        }
        if self.source.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("source.base_url is empty".to_string()));
        }
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "source.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.source.initial_backoff_ms > self.source.max_backoff_ms {
            return Err(ConfigError::Validation(
                "source.initial_backoff_ms exceeds source.max_backoff_ms".to_string(),
            ));
        }
        let ingest = &self.ingest;
        if ingest.move_limit == 0 {
            return Err(ConfigError::Validation(
                "ingest.move_limit must be at least 1".to_string(),
            ));
        }
        if ingest.group_limit == 0 {
            return Err(ConfigError::Validation(
                "ingest.group_limit must be at least 1".to_string(),
            ));
        }
        if ingest.min_key == 0 {
            return Err(ConfigError::Validation(
                "ingest.min_key must be at least 1".to_string(),
            ));
        }
        if let Some(max) = ingest.max_key {
            if max < ingest.min_key {
                return Err(ConfigError::Validation(format!(
                    "ingest.max_key {} is below ingest.min_key {}",
                    max, ingest.min_key
                )));
            }
        }
        Ok(())
    }

    /// Engine configuration built from the file's limits
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig::default()
            .with_move_limit(self.ingest.move_limit)
            .with_group_limit(self.ingest.group_limit)
            .with_key_bounds(self.ingest.min_key, self.ingest.max_key)
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}
