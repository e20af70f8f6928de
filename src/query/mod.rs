//! Query model
//!
//! Queries are immutable values built by application code and resolved
//! against a model's standing scopes by the executor.
//!
//! # Composition
//!
//! - Caller conditions are combined with AND
//! - Scopes append their own conditions during resolution
//! - OR groups stay parenthesized so later conditions cannot rebind them
//! - Bypassing a scope returns a new query; nothing shared is mutated

mod ast;
mod explain;

pub use ast::{Condition, FilterOp, Predicate, Query, SortDirection, SortSpec};
pub use explain::{render_condition, ExplainPlan};
