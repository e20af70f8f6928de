//! Visibility column configuration

use serde::{Deserialize, Serialize};

use crate::model::{validate_identifier, ModelError, ModelResult};

/// Default "published at" column
pub const DEFAULT_PUBLISHED_AT: &str = "published_at";

/// Default "expired at" column
pub const DEFAULT_EXPIRED_AT: &str = "expired_at";

/// Column names holding a record's visibility window
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublishableColumns {
    #[serde(default = "default_published_at")]
    pub published_at: String,
    #[serde(default = "default_expired_at")]
    pub expired_at: String,
}

fn default_published_at() -> String {
    DEFAULT_PUBLISHED_AT.to_string()
}

fn default_expired_at() -> String {
    DEFAULT_EXPIRED_AT.to_string()
}

impl Default for PublishableColumns {
    fn default() -> Self {
        Self {
            published_at: default_published_at(),
            expired_at: default_expired_at(),
        }
    }
}

impl PublishableColumns {
    pub fn new(published_at: impl Into<String>, expired_at: impl Into<String>) -> Self {
        Self {
            published_at: published_at.into(),
            expired_at: expired_at.into(),
        }
    }

    /// Overrides only the "published at" column
    pub fn with_published_at(mut self, column: impl Into<String>) -> Self {
        self.published_at = column.into();
        self
    }

    /// Overrides only the "expired at" column
    pub fn with_expired_at(mut self, column: impl Into<String>) -> Self {
        self.expired_at = column.into();
        self
    }

    /// Both names must be identifiers and must differ
    pub fn validate(&self) -> ModelResult<()> {
        validate_identifier("column", &self.published_at)?;
        validate_identifier("column", &self.expired_at)?;
        if self.published_at == self.expired_at {
            return Err(ModelError::SharedColumn(self.published_at.clone()));
        }
        Ok(())
    }
}
