//! # Model Errors
//!
//! Configuration errors raised while registering a model. All of them
//! surface at registration time so a bad column override can never reach a
//! query.

use thiserror::Error;

/// Result type for model registration
pub type ModelResult<T> = Result<T, ModelError>;

/// Model configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A model, table or column name is not a plain identifier
    #[error("Invalid {kind} name '{value}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier {
        /// What the name was for (model, table, column)
        kind: &'static str,
        /// The rejected value
        value: String,
    },

    /// Both visibility timestamps point at the same column
    #[error("published_at and expired_at must be distinct columns, both are '{0}'")]
    SharedColumn(String),

    /// A model was registered twice with different definitions
    #[error("Model '{0}' is already registered with a different definition")]
    ConflictingDefinition(String),

    /// The same behavior was declared twice on one model
    #[error("Behavior '{behavior}' declared more than once on model '{model}'")]
    DuplicateBehavior {
        model: String,
        behavior: String,
    },

    /// Lookup of a model that was never registered
    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

impl ModelError {
    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidIdentifier { .. } => "PUB_MODEL_INVALID_IDENTIFIER",
            ModelError::SharedColumn(_) => "PUB_MODEL_SHARED_COLUMN",
            ModelError::ConflictingDefinition(_) => "PUB_MODEL_CONFLICT",
            ModelError::DuplicateBehavior { .. } => "PUB_MODEL_DUPLICATE_BEHAVIOR",
            ModelError::UnknownModel(_) => "PUB_MODEL_UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::InvalidIdentifier {
            kind: "column",
            value: "published at".into(),
        };
        let display = err.to_string();
        assert!(display.contains("column"));
        assert!(display.contains("published at"));
        assert_eq!(err.code(), "PUB_MODEL_INVALID_IDENTIFIER");
    }

    #[test]
    fn test_shared_column_display() {
        let err = ModelError::SharedColumn("visible_at".into());
        assert!(err.to_string().contains("visible_at"));
    }
}
