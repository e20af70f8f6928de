//! CLI-specific error types
//!
//! Every CLI failure ends the process with a non-zero exit code after one
//! JSON error object is written to stdout.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::executor::ExecutorError;
use crate::model::ModelError;
use crate::publishable::PublishError;
use crate::storage::StorageError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout)
    IoError,
    /// Malformed argument value
    InvalidArgument,
    /// Model not declared
    UnknownModel,
    /// No record with the given id
    RecordNotFound,
    /// Query failed
    QueryFailed,
    /// Publish or expire failed
    TransitionFailed,
    /// Record store could not be read
    StorageFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PUB_CLI_CONFIG_ERROR",
            Self::IoError => "PUB_CLI_IO_ERROR",
            Self::InvalidArgument => "PUB_CLI_INVALID_ARGUMENT",
            Self::UnknownModel => "PUB_CLI_UNKNOWN_MODEL",
            Self::RecordNotFound => "PUB_CLI_RECORD_NOT_FOUND",
            Self::QueryFailed => "PUB_CLI_QUERY_FAILED",
            Self::TransitionFailed => "PUB_CLI_TRANSITION_FAILED",
            Self::StorageFailed => "PUB_CLI_STORAGE_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Invalid argument
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// Record not found
    pub fn record_not_found(model: &str, id: &str) -> Self {
        Self::new(
            CliErrorCode::RecordNotFound,
            format!("No '{}' record with id {}", model, id),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<ModelError> for CliError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::UnknownModel(_) => Self::new(CliErrorCode::UnknownModel, e.to_string()),
            other => Self::config_error(other.to_string()),
        }
    }
}

impl From<ExecutorError> for CliError {
    fn from(e: ExecutorError) -> Self {
        Self::new(CliErrorCode::QueryFailed, e.to_string())
    }
}

impl From<PublishError> for CliError {
    fn from(e: PublishError) -> Self {
        Self::new(CliErrorCode::TransitionFailed, e.to_string())
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::new(CliErrorCode::StorageFailed, format!("{}: {}", e.code(), e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
