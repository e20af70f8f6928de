//! Query executor
//!
//! # Execution Flow (strict order)
//!
//! 1. Check the query targets the model's table
//! 2. Read the clock once
//! 3. Apply every standing scope the query did not bypass
//! 4. Filter candidate records by the resolved conditions
//! 5. Apply sort (if specified)
//! 6. Apply limit

use std::sync::Arc;

use super::errors::{ExecutorError, ExecutorResult};
use super::filters::ConditionFilter;
use super::result::{ExecutionResult, ResolvedQuery};
use super::sorter::ResultSorter;
use crate::clock::Clock;
use crate::model::{ModelDescriptor, Record};
use crate::observability::{log_event_with_fields, Event};
use crate::query::Query;
use crate::storage::RecordStore;

/// Resolves and runs queries against a model
pub struct QueryExecutor {
    clock: Arc<dyn Clock>,
}

impl QueryExecutor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Applies the model's standing scopes to a query.
    ///
    /// The clock is read exactly once; every scope sees the same instant.
    pub fn resolve(&self, query: &Query, model: &ModelDescriptor) -> ExecutorResult<ResolvedQuery> {
        if query.collection != model.table() {
            return Err(ExecutorError::model_mismatch(&query.collection, model.table()));
        }

        let now = self.clock.now();
        let mut resolved = query.clone();
        let mut applied_scopes = Vec::new();
        let mut bypassed_scopes = Vec::new();

        for scope in model.scopes() {
            if query.excludes_scope(scope.name()) {
                bypassed_scopes.push(scope.name().to_string());
                continue;
            }
            scope.apply(&mut resolved, model, now);
            applied_scopes.push(scope.name().to_string());
        }

        let applied = applied_scopes.join(",");
        let bypassed = bypassed_scopes.join(",");
        log_event_with_fields(
            Event::QueryResolved,
            &[
                ("collection", model.table()),
                ("applied_scopes", applied.as_str()),
                ("bypassed_scopes", bypassed.as_str()),
            ],
        );

        Ok(ResolvedQuery {
            query: resolved,
            now,
            applied_scopes,
            bypassed_scopes,
        })
    }

    /// Runs a query over an in-hand set of candidate records
    pub fn execute(
        &self,
        query: &Query,
        model: &ModelDescriptor,
        candidates: Vec<Record>,
    ) -> ExecutorResult<ExecutionResult> {
        let resolved = self.resolve(query, model)?;
        Ok(Self::run(&resolved, model, candidates))
    }

    /// Loads the model's table from a store and runs a query over it
    pub fn fetch(
        &self,
        store: &dyn RecordStore,
        query: &Query,
        model: &ModelDescriptor,
    ) -> ExecutorResult<ExecutionResult> {
        let resolved = self.resolve(query, model)?;
        let candidates = store.all(model)?;
        Ok(Self::run(&resolved, model, candidates))
    }

    fn run(resolved: &ResolvedQuery, model: &ModelDescriptor, candidates: Vec<Record>) -> ExecutionResult {
        let filter = ConditionFilter::new(model);
        let scanned_count = candidates.len();

        let mut records: Vec<Record> = candidates
            .into_iter()
            .filter(|r| r.model == model.name())
            .filter(|r| filter.matches_all(r, &resolved.query.conditions))
            .collect();

        if let Some(ref sort) = resolved.query.sort {
            ResultSorter::sort(&mut records, sort, model);
        }

        let mut limit_applied = false;
        if let Some(limit) = resolved.query.limit {
            let limit = usize::try_from(limit).unwrap_or(usize::MAX);
            if records.len() > limit {
                records.truncate(limit);
                limit_applied = true;
            }
        }

        ExecutionResult {
            returned_count: records.len(),
            records,
            scanned_count,
            limit_applied,
            now: resolved.now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::{ModelDefinition, ModelRegistry, Scope};
    use crate::query::{Predicate, SortSpec};
    use crate::storage::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the instant it was applied with
    #[derive(Debug, Default)]
    struct Tenant {
        seen: Mutex<Vec<DateTime<Utc>>>,
    }

    impl Scope for Tenant {
        fn name(&self) -> &str {
            "tenant"
        }

        fn apply(&self, query: &mut Query, model: &ModelDescriptor, now: DateTime<Utc>) {
            self.seen.lock().unwrap().push(now);
            query.push_condition(Predicate::eq(model.qualify("tenant"), json!("acme")));
        }
    }

    #[derive(Debug)]
    struct Scoped(Arc<Tenant>);

    impl crate::model::Behavior for Scoped {
        fn name(&self) -> &'static str {
            "tenant"
        }

        fn initialize(&self, model: &mut ModelDescriptor) -> crate::model::ModelResult<()> {
            model.add_scope(self.0.clone());
            Ok(())
        }
    }

    fn executor() -> QueryExecutor {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        QueryExecutor::new(Arc::new(FixedClock::new(at)))
    }

    fn tenant_model(tenant: Arc<Tenant>) -> Arc<ModelDescriptor> {
        ModelRegistry::new()
            .register(
                ModelDefinition::new("article")
                    .with_table("articles")
                    .with_behavior(Scoped(tenant)),
            )
            .unwrap()
    }

    #[test]
    fn test_collection_mismatch_rejected() {
        let model = tenant_model(Arc::default());
        let err = executor().resolve(&Query::new("pages"), &model).unwrap_err();
        assert_eq!(err.code(), crate::executor::ExecutorErrorCode::ModelMismatch);
    }

    #[test]
    fn test_scope_applied_and_bypassed() {
        let tenant = Arc::new(Tenant::default());
        let model = tenant_model(tenant.clone());
        let exec = executor();

        let resolved = exec.resolve(&Query::new("articles"), &model).unwrap();
        assert!(resolved.applied("tenant"));
        assert_eq!(resolved.query.conditions.len(), 1);

        let bypassed = exec
            .resolve(&Query::new("articles").without_scope("tenant"), &model)
            .unwrap();
        assert!(!bypassed.applied("tenant"));
        assert_eq!(bypassed.bypassed_scopes, vec!["tenant".to_string()]);
        assert!(bypassed.query.conditions.is_empty());
        assert_eq!(tenant.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_filters_sorts_limits() {
        let model = tenant_model(Arc::default());
        let store = MemoryStore::new();
        for (rank, tenant) in [(2, "acme"), (1, "acme"), (3, "other"), (4, "acme")] {
            let record = Record::new("article")
                .with_attribute("rank", json!(rank))
                .with_attribute("tenant", json!(tenant));
            store.save(&model, &record).unwrap();
        }

        let query = Query::new("articles")
            .with_sort(SortSpec::asc("rank"))
            .with_limit(2);
        let result = executor().fetch(&store, &query, &model).unwrap();

        assert_eq!(result.scanned_count, 4);
        assert_eq!(result.returned_count, 2);
        assert!(result.limit_applied);
        let ranks: Vec<&serde_json::Value> = result.records.iter().map(|r| r.get("rank").unwrap()).collect();
        assert_eq!(ranks, vec![&json!(1), &json!(2)]);
    }

    #[test]
    fn test_explain_lists_scopes() {
        let model = tenant_model(Arc::default());
        let plan = executor()
            .resolve(&Query::new("articles").with_limit(5), &model)
            .unwrap()
            .explain();

        assert_eq!(plan.applied_scopes, vec!["tenant".to_string()]);
        assert_eq!(plan.where_clause.as_deref(), Some("articles.tenant = 'acme'"));
        assert_eq!(plan.now, "2024-03-01T00:00:00Z");
        assert_eq!(plan.limit, Some(5));
    }
}
