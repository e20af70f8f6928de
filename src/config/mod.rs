//! Configuration file
//!
//! Declares models and where their records live:
//!
//! ```json
//! {
//!   "data_file": "./records.json",
//!   "log_level": "info",
//!   "models": [
//!     { "name": "article", "table": "articles", "publishable": true },
//!     { "name": "page", "publishable": true,
//!       "columns": { "published_at": "live_from", "expired_at": "live_until" } }
//!   ]
//! }
//! ```
//!
//! Relative `data_file` paths resolve against the config file's directory.
//! Every model is registered while loading, so a bad column override fails
//! here and never at query time.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{Cast, ModelDefinition, ModelRegistry};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::publishable::{Publishable, PublishableColumns};

/// One model declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name
    pub name: String,
    /// Table name (defaults to the model name)
    #[serde(default)]
    pub table: Option<String>,
    /// Whether the model adopts the publishable behavior
    #[serde(default)]
    pub publishable: bool,
    /// Visibility column overrides
    #[serde(default)]
    pub columns: Option<PublishableColumns>,
    /// Explicit casts
    #[serde(default)]
    pub casts: BTreeMap<String, Cast>,
}

impl ModelConfig {
    /// Converts the declaration into a model definition
    pub fn to_definition(&self) -> ModelDefinition {
        let mut definition = ModelDefinition::new(&self.name);
        if let Some(ref table) = self.table {
            definition = definition.with_table(table);
        }
        for (column, cast) in &self.casts {
            definition = definition.with_cast(column, *cast);
        }
        if self.publishable {
            let columns = self.columns.clone().unwrap_or_default();
            definition = definition.with_behavior(Publishable::with_columns(columns));
        }
        definition
    }
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishableConfig {
    /// JSON data file backing the record store
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Minimum log severity (trace, info, warn, error, off)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Model declarations
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("records.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PublishableConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            log_level: default_log_level(),
            models: Vec::new(),
        }
    }
}

impl PublishableConfig {
    /// Parses and validates a configuration from JSON text
    pub fn from_json(content: &str, origin: &str) -> ConfigResult<Self> {
        let config: PublishableConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::parse(origin, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything that can be checked without registering models
    pub fn validate(&self) -> ConfigResult<()> {
        self.severity()?;

        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.name.as_str()) {
                return Err(ConfigError::DuplicateModel(model.name.clone()));
            }
            if model.columns.is_some() && !model.publishable {
                return Err(ConfigError::ColumnsWithoutPublishable(model.name.clone()));
            }
        }
        Ok(())
    }

    /// Parsed log level
    pub fn severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level)
            .ok_or_else(|| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Registers every declared model in a fresh registry
    pub fn build_registry(&self) -> ConfigResult<ModelRegistry> {
        let registry = ModelRegistry::new();
        for model in &self.models {
            registry
                .register(model.to_definition())
                .map_err(|source| ConfigError::Model {
                    model: model.name.clone(),
                    source,
                })?;
        }
        Ok(registry)
    }
}

/// A loaded configuration with its models registered
#[derive(Debug)]
pub struct LoadedConfig {
    /// Parsed file contents
    pub config: PublishableConfig,
    /// Data file path, resolved against the config file's directory
    pub data_file: PathBuf,
    /// Registered models
    pub registry: ModelRegistry,
}

/// Loads, validates and registers a configuration file.
///
/// Applies the configured log level before registering models.
pub fn load(path: &Path) -> ConfigResult<LoadedConfig> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::io(&display, e))?;
    let config = PublishableConfig::from_json(&content, &display)?;

    Logger::set_min_severity(config.severity()?);

    let data_file = if config.data_file.is_absolute() {
        config.data_file.clone()
    } else {
        path.parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&config.data_file)
    };

    let registry = config.build_registry()?;

    let model_count = config.models.len().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("path", display.as_str()), ("models", model_count.as_str())],
    );

    Ok(LoadedConfig {
        config,
        data_file,
        registry,
    })
}
