//! Query tree structures
//!
//! A [`Query`] is a plain value: building, narrowing and bypassing scopes
//! all return new values and never touch shared state.

use std::collections::BTreeSet;

use serde_json::Value;

/// Filter operation types
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Equality: field = value
    Eq(Value),
    /// Greater than or equal: field >= value
    Gte(Value),
    /// Greater than: field > value
    Gt(Value),
    /// Less than or equal: field <= value
    Lte(Value),
    /// Less than: field < value
    Lt(Value),
    /// field IS NULL (missing counts as null)
    IsNull,
    /// field IS NOT NULL
    NotNull,
}

impl FilterOp {
    /// Returns the SQL-like operator for explain output
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "=",
            FilterOp::Gte(_) => ">=",
            FilterOp::Gt(_) => ">",
            FilterOp::Lte(_) => "<=",
            FilterOp::Lt(_) => "<",
            FilterOp::IsNull => "IS NULL",
            FilterOp::NotNull => "IS NOT NULL",
        }
    }

    /// Returns the comparison operand, if the operation has one
    pub fn operand(&self) -> Option<&Value> {
        match self {
            FilterOp::Eq(v)
            | FilterOp::Gte(v)
            | FilterOp::Gt(v)
            | FilterOp::Lte(v)
            | FilterOp::Lt(v) => Some(v),
            FilterOp::IsNull | FilterOp::NotNull => None,
        }
    }
}

/// A single predicate (field + operation)
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Field name, optionally qualified as `table.column`
    pub field: String,
    /// Filter operation
    pub op: FilterOp,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: FilterOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }

    /// Create an equality predicate
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Eq(value))
    }

    /// Create a range predicate (gte)
    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Gte(value))
    }

    /// Create a range predicate (gt)
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Gt(value))
    }

    /// Create a range predicate (lte)
    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Lte(value))
    }

    /// Create a range predicate (lt)
    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Lt(value))
    }

    /// Create a null check
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::IsNull)
    }

    /// Create a not-null check
    pub fn not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::NotNull)
    }
}

/// A node of the filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Leaf predicate
    Predicate(Predicate),
    /// Every child must hold
    All(Vec<Condition>),
    /// At least one child must hold; rendered as a parenthesized group
    Any(Vec<Condition>),
}

impl Condition {
    /// Conjunction of the given children
    pub fn all(children: impl IntoIterator<Item = Condition>) -> Self {
        Condition::All(children.into_iter().collect())
    }

    /// Disjunction of the given children
    pub fn any(children: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Any(children.into_iter().collect())
    }

    /// Visits every leaf predicate in tree order
    pub fn predicates(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            Condition::Predicate(p) => out.push(p),
            Condition::All(children) | Condition::Any(children) => {
                for child in children {
                    child.collect_predicates(out);
                }
            }
        }
    }
}

impl From<Predicate> for Condition {
    fn from(predicate: Predicate) -> Self {
        Condition::Predicate(predicate)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Query against one model's table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Target table name
    pub collection: String,
    /// Caller conditions (all combined with AND)
    pub conditions: Vec<Condition>,
    /// Standing scopes disabled for this query only
    pub excluded_scopes: BTreeSet<String>,
    /// Sort specification
    pub sort: Option<SortSpec>,
    /// Result limit
    pub limit: Option<u64>,
}

impl Query {
    /// Creates a new query builder
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            conditions: Vec::new(),
            excluded_scopes: BTreeSet::new(),
            sort: None,
            limit: None,
        }
    }

    /// Adds a condition (AND)
    pub fn with_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.push_condition(condition);
        self
    }

    /// Adds a predicate (AND)
    pub fn with_predicate(self, predicate: Predicate) -> Self {
        self.with_condition(predicate)
    }

    /// Adds an equality filter
    pub fn filter_eq(self, field: impl Into<String>, value: Value) -> Self {
        self.with_predicate(Predicate::eq(field, value))
    }

    /// Appends a condition in place; used by scopes during resolution
    pub fn push_condition(&mut self, condition: impl Into<Condition>) {
        self.conditions.push(condition.into());
    }

    /// Sets the sort specification
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the limit
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns a query with the named standing scope removed.
    ///
    /// Other standing scopes stay in force. Unknown names are ignored.
    pub fn without_scope(mut self, name: impl Into<String>) -> Self {
        self.excluded_scopes.insert(name.into());
        self
    }

    /// Returns true if the named scope is bypassed for this query
    pub fn excludes_scope(&self, name: &str) -> bool {
        self.excluded_scopes.contains(name)
    }

    /// All caller conditions as one conjunction
    pub fn condition(&self) -> Condition {
        Condition::All(self.conditions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_builder() {
        let query = Query::new("articles")
            .filter_eq("author", json!("ada"))
            .with_sort(SortSpec::desc("published_at"))
            .with_limit(10);

        assert_eq!(query.collection, "articles");
        assert_eq!(query.conditions.len(), 1);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.sort.as_ref().unwrap().direction, SortDirection::Desc);
    }

    #[test]
    fn test_without_scope_is_pure() {
        let base = Query::new("articles").filter_eq("author", json!("ada"));
        let bypassed = base.clone().without_scope("published");

        assert!(!base.excludes_scope("published"));
        assert!(bypassed.excludes_scope("published"));
        assert!(!bypassed.excludes_scope("tenant"));
        assert_eq!(base.conditions, bypassed.conditions);
    }

    #[test]
    fn test_filter_op_operand() {
        assert_eq!(FilterOp::Lte(json!(3)).operand(), Some(&json!(3)));
        assert_eq!(FilterOp::IsNull.operand(), None);
    }

    #[test]
    fn test_condition_predicates_in_order() {
        let cond = Condition::all([
            Predicate::lte("a", json!(1)).into(),
            Condition::any([Predicate::is_null("b").into(), Predicate::gt("b", json!(2)).into()]),
        ]);

        let fields: Vec<&str> = cond.predicates().iter().map(|p| p.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b", "b"]);
    }
}
