//! Query Executor subsystem
//!
//! Resolves queries against a model's standing scopes and evaluates them
//! over records loaded from a store.
//!
//! # Invariants
//!
//! - One clock reading per resolution, shared by every scope
//! - Bypassing one scope leaves the others in force
//! - Scopes only transform the query; they never touch storage

mod errors;
mod executor;
mod filters;
mod result;
mod sorter;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use executor::QueryExecutor;
pub use filters::ConditionFilter;
pub use result::{ExecutionResult, ResolvedQuery};
pub use sorter::ResultSorter;
