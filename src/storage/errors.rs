//! # Storage Errors

use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Failures reported by a record store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file I/O failed
    #[error("Storage I/O failed on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored data could not be encoded or decoded
    #[error("Storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store refuses writes
    #[error("Store is read-only")]
    ReadOnly,

    /// A record was saved under a model it does not belong to
    #[error("Record {id} belongs to model '{record_model}', not '{model}'")]
    ModelMismatch {
        id: Uuid,
        record_model: String,
        model: String,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::Io { .. } => "PUB_STORAGE_IO",
            StorageError::Serialization(_) => "PUB_STORAGE_SERIALIZATION",
            StorageError::ReadOnly => "PUB_STORAGE_READ_ONLY",
            StorageError::ModelMismatch { .. } => "PUB_STORAGE_MODEL_MISMATCH",
        }
    }
}
