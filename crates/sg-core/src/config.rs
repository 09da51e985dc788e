//! Configuration types and parsing for seedgraph.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Factory configuration from seedgraph.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// First counter value used by the non-zero synthesizer
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Suffix appended to snake-cased type names to derive storage names
    #[serde(default = "default_plural_suffix")]
    pub plural_suffix: String,

    /// Storage backend configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// In-process recording backend (default)
    #[default]
    Memory,
    /// DuckDB
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::Memory => write!(f, "memory"),
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Backend type (memory or duckdb)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (for DuckDB file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            plural_suffix: default_plural_suffix(),
            database: DatabaseConfig::default(),
        }
    }
}

fn default_seed() -> u64 {
    1
}

fn default_plural_suffix() -> String {
    "s".to_string()
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for seedgraph.yml or seedgraph.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("seedgraph.yml");
        let yaml_path = dir.join("seedgraph.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.seed == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "seed must be non-zero".to_string(),
            });
        }
        if self.plural_suffix.chars().any(char::is_whitespace) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "plural_suffix '{}' must not contain whitespace",
                    self.plural_suffix
                ),
            });
        }
        if self.database.path.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
