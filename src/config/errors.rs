//! # Config Errors

use thiserror::Error;

use crate::model::ModelError;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Unknown log level name
    #[error("Invalid log_level '{0}': expected trace, info, warn, error or off")]
    InvalidLogLevel(String),

    /// Model declared twice
    #[error("Model '{0}' declared more than once")]
    DuplicateModel(String),

    /// Column overrides on a model that is not publishable
    #[error("Model '{0}' overrides visibility columns but is not publishable")]
    ColumnsWithoutPublishable(String),

    /// Model registration rejected the declaration
    #[error("Model '{model}': {source}")]
    Model {
        model: String,
        #[source]
        source: ModelError,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<String>, source: serde_json::Error) -> Self {
        ConfigError::Parse {
            path: path.into(),
            source,
        }
    }
}
