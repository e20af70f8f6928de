//! Condition filtering for query execution
//!
//! Evaluates a condition tree against a record. Columns cast as datetime
//! compare chronologically; everything else compares without coercion.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

use crate::model::{decode_datetime, Cast, ModelDescriptor, Record};
use crate::query::{Condition, FilterOp, Predicate};

/// Reads a column from a record. `id` resolves to the record ID.
pub(crate) fn field_value<'a>(record: &'a Record, column: &str) -> Option<Cow<'a, Value>> {
    if column == "id" {
        return Some(Cow::Owned(Value::String(record.id.to_string())));
    }
    record.get(column).map(Cow::Borrowed)
}

/// Evaluates condition trees against records of one model
pub struct ConditionFilter<'m> {
    model: &'m ModelDescriptor,
}

impl<'m> ConditionFilter<'m> {
    pub fn new(model: &'m ModelDescriptor) -> Self {
        Self { model }
    }

    /// Checks if a record satisfies every condition (AND semantics)
    pub fn matches_all(&self, record: &Record, conditions: &[Condition]) -> bool {
        conditions.iter().all(|c| self.matches(record, c))
    }

    /// Checks if a record satisfies one condition
    pub fn matches(&self, record: &Record, condition: &Condition) -> bool {
        match condition {
            Condition::Predicate(p) => self.matches_predicate(record, p),
            Condition::All(children) => children.iter().all(|c| self.matches(record, c)),
            Condition::Any(children) => children.iter().any(|c| self.matches(record, c)),
        }
    }

    fn matches_predicate(&self, record: &Record, predicate: &Predicate) -> bool {
        let column = self.model.unqualify(&predicate.field);
        let actual = field_value(record, column);

        match &predicate.op {
            FilterOp::IsNull => return actual.is_none(),
            FilterOp::NotNull => return actual.is_some(),
            _ => {}
        }

        // Missing or null values never satisfy a comparison
        let actual = match actual {
            Some(v) => v,
            None => return false,
        };
        let cast = self.model.comparison_cast(column);

        match &predicate.op {
            FilterOp::Eq(expected) => Self::eq_match(&actual, expected, cast),
            FilterOp::Gte(bound) => Self::compare(&actual, bound, cast).map_or(false, Ordering::is_ge),
            FilterOp::Gt(bound) => Self::compare(&actual, bound, cast).map_or(false, Ordering::is_gt),
            FilterOp::Lte(bound) => Self::compare(&actual, bound, cast).map_or(false, Ordering::is_le),
            FilterOp::Lt(bound) => Self::compare(&actual, bound, cast).map_or(false, Ordering::is_lt),
            FilterOp::IsNull | FilterOp::NotNull => unreachable!("handled above"),
        }
    }

    /// Exact equality; datetimes compare as instants
    fn eq_match(actual: &Value, expected: &Value, cast: Option<Cast>) -> bool {
        if cast == Some(Cast::Datetime) {
            if let (Some(a), Some(b)) = (decode_datetime(actual), decode_datetime(expected)) {
                return a == b;
            }
        }
        actual == expected
    }

    /// Ordering of two values, `None` when they are not comparable
    fn compare(actual: &Value, bound: &Value, cast: Option<Cast>) -> Option<Ordering> {
        if cast == Some(Cast::Datetime) {
            return match (decode_datetime(actual), decode_datetime(bound)) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => None,
            };
        }

        match (actual, bound) {
            (Value::Number(a), Value::Number(b)) => {
                if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                    return Some(ai.cmp(&bi));
                }
                match (a.as_f64(), b.as_f64()) {
                    (Some(af), Some(bf)) => af.partial_cmp(&bf),
                    _ => None,
                }
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
