//! Explain output for resolved queries
//!
//! Renders the filter tree as a SQL-like WHERE clause. OR groups are always
//! parenthesized so they compose with conditions appended later.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::ast::{Condition, Predicate};

/// Renders a condition tree as a WHERE-clause fragment.
///
/// Empty AND groups are dropped from their parent; on their own they render
/// as `TRUE`. An empty OR group renders as `FALSE`.
pub fn render_condition(condition: &Condition) -> String {
    match condition {
        Condition::Predicate(p) => render_predicate(p),
        // Nested AND groups flatten without changing meaning
        Condition::All(children) => {
            let parts: Vec<String> = children
                .iter()
                .filter(|c| !is_empty_all(c))
                .map(render_condition)
                .collect();
            if parts.is_empty() {
                "TRUE".to_string()
            } else {
                parts.join(" AND ")
            }
        }
        Condition::Any(children) if children.is_empty() => "FALSE".to_string(),
        Condition::Any(children) => {
            let parts: Vec<String> = children
                .iter()
                .map(|c| match c {
                    Condition::All(inner) if inner.iter().filter(|i| !is_empty_all(i)).count() > 1 => {
                        format!("({})", render_condition(c))
                    }
                    _ => render_condition(c),
                })
                .collect();
            format!("({})", parts.join(" OR "))
        }
    }
}

fn is_empty_all(condition: &Condition) -> bool {
    match condition {
        Condition::All(children) => children.iter().all(is_empty_all),
        _ => false,
    }
}

fn render_predicate(predicate: &Predicate) -> String {
    match predicate.op.operand() {
        Some(value) => format!("{} {} {}", predicate.field, predicate.op.symbol(), render_value(value)),
        None => format!("{} {}", predicate.field, predicate.op.symbol()),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => other.to_string(),
    }
}

/// Explain output for one resolved query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainPlan {
    /// Target table
    pub collection: String,
    /// Instant the scopes were resolved against (RFC 3339)
    pub now: String,
    /// Standing scopes applied, in order
    pub applied_scopes: Vec<String>,
    /// Standing scopes bypassed for this query
    pub bypassed_scopes: Vec<String>,
    /// Rendered WHERE clause, `None` when unfiltered
    pub where_clause: Option<String>,
    /// Sort description
    pub sort: Option<String>,
    /// Limit
    pub limit: Option<u64>,
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {}", self.collection)?;
        if let Some(ref clause) = self.where_clause {
            write!(f, " WHERE {}", clause)?;
        }
        if let Some(ref sort) = self.sort {
            write!(f, " ORDER BY {}", sort)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        Ok(())
    }
}
