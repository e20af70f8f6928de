//! The published scope
//!
//! Standing filter restricting default queries to records inside their
//! visibility window:
//!
//! ```text
//! t.published_at <= now AND (t.expired_at IS NULL OR t.expired_at > now)
//! ```

use chrono::{DateTime, Utc};

use super::columns::PublishableColumns;
use crate::model::{encode_datetime, ModelDescriptor, Scope};
use crate::query::{Condition, Predicate, Query};

/// Standing scope hiding unpublished, scheduled and expired records
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishedScope;

impl PublishedScope {
    /// Name used to bypass the scope
    pub const NAME: &'static str = "published";

    /// The visibility condition for a model at `now`
    pub fn condition(model: &ModelDescriptor, now: DateTime<Utc>) -> Condition {
        let defaults;
        let columns = match model.publishable() {
            Some(columns) => columns,
            None => {
                defaults = PublishableColumns::default();
                &defaults
            }
        };
        let published_at = model.qualify(&columns.published_at);
        let expired_at = model.qualify(&columns.expired_at);
        let now = encode_datetime(now);

        Condition::all([
            Predicate::lte(published_at, now.clone()).into(),
            Condition::any([
                Predicate::is_null(expired_at.clone()).into(),
                Predicate::gt(expired_at, now).into(),
            ]),
        ])
    }
}

impl Scope for PublishedScope {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, query: &mut Query, model: &ModelDescriptor, now: DateTime<Utc>) {
        match Self::condition(model, now) {
            // Keep the two conjuncts flat so the OR group stays its own clause
            Condition::All(parts) => {
                for part in parts {
                    query.push_condition(part);
                }
            }
            other => query.push_condition(other),
        }
    }
}

/// Query extension adding the published-scope bypass
pub trait PublishableQueryExt {
    /// Returns the query with the published scope removed, so unpublished,
    /// scheduled and expired records are included. Other scopes still apply.
    fn with_not_published(self) -> Self;
}

impl PublishableQueryExt for Query {
    fn with_not_published(self) -> Self {
        self.without_scope(PublishedScope::NAME)
    }
}
