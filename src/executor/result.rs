//! Result types for query resolution and execution

use chrono::{DateTime, SecondsFormat, Utc};

use crate::model::Record;
use crate::query::{render_condition, Condition, ExplainPlan, Query};

/// A query with its model's standing scopes applied
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    /// Caller conditions followed by scope conditions
    pub query: Query,
    /// The single instant every scope was resolved against
    pub now: DateTime<Utc>,
    /// Scopes applied, in registration order
    pub applied_scopes: Vec<String>,
    /// Scopes the query bypassed
    pub bypassed_scopes: Vec<String>,
}

impl ResolvedQuery {
    /// Final filter as one conjunction
    pub fn condition(&self) -> Condition {
        self.query.condition()
    }

    /// Returns true if the named scope contributed conditions
    pub fn applied(&self, scope: &str) -> bool {
        self.applied_scopes.iter().any(|s| s == scope)
    }

    /// Explain output
    pub fn explain(&self) -> ExplainPlan {
        let where_clause = if self.query.conditions.is_empty() {
            None
        } else {
            Some(render_condition(&self.condition()))
        };

        ExplainPlan {
            collection: self.query.collection.clone(),
            now: self.now.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            applied_scopes: self.applied_scopes.clone(),
            bypassed_scopes: self.bypassed_scopes.clone(),
            where_clause,
            sort: self
                .query
                .sort
                .as_ref()
                .map(|s| format!("{} {}", s.field, s.direction.as_str())),
            limit: self.query.limit,
        }
    }
}

/// Result of query execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Records in result order
    pub records: Vec<Record>,
    /// Number of records scanned
    pub scanned_count: usize,
    /// Number of records returned
    pub returned_count: usize,
    /// Whether limit was applied
    pub limit_applied: bool,
    /// Instant the query was resolved against
    pub now: DateTime<Utc>,
}

impl ExecutionResult {
    /// IDs of returned records, in order
    pub fn ids(&self) -> Vec<uuid::Uuid> {
        self.records.iter().map(|r| r.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
