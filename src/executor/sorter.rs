//! Result sorting for query execution

use std::cmp::Ordering;

use serde_json::Value;

use super::filters::field_value;
use crate::model::{decode_datetime, Cast, ModelDescriptor, Record};
use crate::query::{SortDirection, SortSpec};

/// Sorts result records
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts records according to the sort specification.
    ///
    /// Sort is stable: ties keep store order.
    pub fn sort(records: &mut [Record], sort_spec: &SortSpec, model: &ModelDescriptor) {
        let column = model.unqualify(&sort_spec.field);
        let cast = model.comparison_cast(column);

        records.sort_by(|a, b| {
            let a_val = field_value(a, column);
            let b_val = field_value(b, column);

            let ordering = Self::compare_values(a_val.as_deref(), b_val.as_deref(), cast);

            match sort_spec.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    /// Compares two values for sorting.
    ///
    /// Ordering rules:
    /// - missing < bool < number < string
    /// - datetime columns order chronologically
    fn compare_values(a: Option<&Value>, b: Option<&Value>, cast: Option<Cast>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                if cast == Some(Cast::Datetime) {
                    if let (Some(a_dt), Some(b_dt)) = (decode_datetime(a_val), decode_datetime(b_val)) {
                        return a_dt.cmp(&b_dt);
                    }
                }

                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);
                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                    (Value::Number(a_n), Value::Number(b_n)) => {
                        let a_f = a_n.as_f64().unwrap_or(0.0);
                        let b_f = b_n.as_f64().unwrap_or(0.0);
                        a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
                    _ => Ordering::Equal,
                }
            }
        }
    }
}
