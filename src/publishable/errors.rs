//! # Publish Errors
//!
//! A cancelled publish or expire is not an error: it returns `Ok(false)`.
//! Storage failures pass through unchanged inside [`PublishError::Storage`].

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Result type for publish / expire
pub type PublishResult<T> = Result<T, PublishError>;

/// Publish / expire failures
#[derive(Debug, Error)]
pub enum PublishError {
    /// The model never adopted the publishable behavior
    #[error("Model '{0}' is not publishable")]
    NotPublishable(String),

    /// The record belongs to a different model
    #[error("Record {id} belongs to model '{record_model}', not '{model}'")]
    ModelMismatch {
        id: Uuid,
        record_model: String,
        model: String,
    },

    /// The store could not persist the record
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PublishError {
    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            PublishError::NotPublishable(_) => "PUB_NOT_PUBLISHABLE",
            PublishError::ModelMismatch { .. } => "PUB_MODEL_MISMATCH",
            PublishError::Storage(e) => e.code(),
        }
    }

    /// Returns true if the failure came from the store
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, PublishError::Storage(_))
    }
}
