//! The publishable behavior
//!
//! Adopting [`Publishable`] on a model definition does three things at
//! registration:
//!
//! 1. Validates and records the visibility column names
//! 2. Registers [`PublishedScope`] as a standing scope
//! 3. Declares both columns as datetimes unless the definition already
//!    cast them

use std::sync::Arc;

use super::columns::PublishableColumns;
use super::scope::PublishedScope;
use crate::model::{Behavior, Cast, ModelDescriptor, ModelResult};

/// Behavior giving a model a scheduled visibility window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Publishable {
    columns: PublishableColumns,
}

impl Publishable {
    /// Publishable with the default `published_at` / `expired_at` columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishable with overridden column names
    pub fn with_columns(columns: PublishableColumns) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &PublishableColumns {
        &self.columns
    }
}

impl Behavior for Publishable {
    fn name(&self) -> &'static str {
        "publishable"
    }

    fn describe(&self) -> String {
        format!(
            "publishable({},{})",
            self.columns.published_at, self.columns.expired_at
        )
    }

    fn initialize(&self, model: &mut ModelDescriptor) -> ModelResult<()> {
        self.columns.validate()?;

        model.set_publishable(self.columns.clone());
        model.add_scope(Arc::new(PublishedScope));
        model.cast_if_absent(&self.columns.published_at, Cast::Datetime);
        model.cast_if_absent(&self.columns.expired_at, Cast::Datetime);

        Ok(())
    }
}
