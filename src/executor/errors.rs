//! Executor error types
//!
//! Error codes:
//! - PUB_QUERY_MODEL_MISMATCH: query targets another model's table
//! - PUB_QUERY_STORAGE_FAILED: the store could not load the table

use std::fmt;

use crate::storage::StorageError;

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Query collection does not match the model table
    ModelMismatch,
    /// Loading candidate records failed
    StorageFailed,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::ModelMismatch => "PUB_QUERY_MODEL_MISMATCH",
            ExecutorErrorCode::StorageFailed => "PUB_QUERY_STORAGE_FAILED",
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
    source: Option<StorageError>,
}

impl ExecutorError {
    /// Query was built for a different table
    pub fn model_mismatch(collection: &str, table: &str) -> Self {
        Self {
            code: ExecutorErrorCode::ModelMismatch,
            message: format!(
                "query targets '{}' but model table is '{}'",
                collection, table
            ),
            source: None,
        }
    }

    /// Store failed while loading candidates
    pub fn storage_failed(source: StorageError) -> Self {
        Self {
            code: ExecutorErrorCode::StorageFailed,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<StorageError> for ExecutorError {
    fn from(e: StorageError) -> Self {
        Self::storage_failed(e)
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
