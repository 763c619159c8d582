//! Application configuration.
//!
//! Loaded from YAML files and environment variables. Binds table names to
//! registered entity models and carries the DynamoDB connection settings.

mod dynamo;

pub use dynamo::DynamoConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "ddb-provision.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "DDB_PROVISION_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "DDB_PROVISION";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "DDB_PROVISION_LOG";

use serde::Deserialize;

use crate::entities::{self, BOOKS_TABLE};
use crate::model::EntityDescriptor;
use crate::schema::AttributeTyping;

/// Errors loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Table '{table}' is bound to unknown entity '{entity}' (known: {known})")]
    UnknownEntity {
        table: String,
        entity: String,
        known: String,
    },

    #[error("Table '{0}' is bound more than once")]
    DuplicateTable(String),
}

/// A table and the entity model stored in it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableBinding {
    /// Table name.
    pub table: String,
    /// Registered entity name (e.g., "book").
    pub entity: String,
}

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// DynamoDB connection settings.
    pub dynamo: DynamoConfig,
    /// How key attribute types are derived.
    pub attribute_typing: AttributeTyping,
    /// Tables to ensure at startup, in order.
    pub tables: Vec<TableBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dynamo: DynamoConfig::default(),
            attribute_typing: AttributeTyping::default(),
            tables: vec![TableBinding {
                table: BOOKS_TABLE.to_string(),
                entity: "book".to_string(),
            }],
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `ddb-provision.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Resolve every binding to its entity descriptor.
    pub fn resolve_tables(&self) -> Result<Vec<(String, EntityDescriptor)>, ConfigError> {
        let mut resolved: Vec<(String, EntityDescriptor)> = Vec::with_capacity(self.tables.len());

        for binding in &self.tables {
            if resolved.iter().any(|(table, _)| table == &binding.table) {
                return Err(ConfigError::DuplicateTable(binding.table.clone()));
            }

            let descriptor = entities::descriptor_for(&binding.entity).ok_or_else(|| {
                ConfigError::UnknownEntity {
                    table: binding.table.clone(),
                    entity: binding.entity.clone(),
                    known: entities::ENTITY_NAMES.join(", "),
                }
            })?;

            resolved.push((binding.table.clone(), descriptor));
        }

        Ok(resolved)
    }
}
