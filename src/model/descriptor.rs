//! Model definitions and their frozen descriptors
//!
//! A [`ModelDefinition`] is what application code declares. Registration
//! turns it into a [`ModelDescriptor`] by running each [`Behavior`]
//! initializer once; the descriptor is then shared immutably.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use regex::Regex;

use super::cast::Cast;
use super::errors::{ModelError, ModelResult};
use crate::publishable::PublishableColumns;
use crate::query::Query;

/// A standing query modifier attached to a model.
///
/// Applied to every query resolved against the model unless the query
/// explicitly excludes it by name.
pub trait Scope: Send + Sync + fmt::Debug {
    /// Unique name used for bypassing
    fn name(&self) -> &str;

    /// Appends this scope's conditions to `query`.
    ///
    /// `now` is read once per resolution and shared by every scope.
    fn apply(&self, query: &mut Query, model: &ModelDescriptor, now: DateTime<Utc>);
}

/// A capability a model adopts at registration time
pub trait Behavior: Send + Sync + fmt::Debug {
    /// Behavior name, unique per model
    fn name(&self) -> &'static str;

    /// Stable description used to detect conflicting re-registration
    fn describe(&self) -> String {
        self.name().to_string()
    }

    /// Prepares the model: validate configuration, add scopes and casts
    fn initialize(&self, model: &mut ModelDescriptor) -> ModelResult<()>;
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"))
}

/// Validates a model, table or column name
pub fn validate_identifier(kind: &'static str, value: &str) -> ModelResult<()> {
    if identifier_pattern().is_match(value) {
        Ok(())
    } else {
        Err(ModelError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

/// Declaration of a record type
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    /// Model name
    pub name: String,
    /// Storage table, defaults to the model name
    pub table: String,
    /// Explicit column casts
    pub casts: BTreeMap<String, Cast>,
    /// Adopted behaviors, initialized in declaration order
    pub behaviors: Vec<Arc<dyn Behavior>>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table: name.clone(),
            name,
            casts: BTreeMap::new(),
            behaviors: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_cast(mut self, column: impl Into<String>, cast: Cast) -> Self {
        self.casts.insert(column.into(), cast);
        self
    }

    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behaviors.push(Arc::new(behavior));
        self
    }

    /// Identity of the definition, compared on re-registration
    pub(crate) fn signature(&self) -> String {
        let casts: Vec<String> = self
            .casts
            .iter()
            .map(|(column, cast)| format!("{}:{}", column, cast.as_str()))
            .collect();
        let behaviors: Vec<String> = self.behaviors.iter().map(|b| b.describe()).collect();
        format!(
            "table={};casts=[{}];behaviors=[{}]",
            self.table,
            casts.join(","),
            behaviors.join(",")
        )
    }
}

/// Registered, initialized model
#[derive(Debug)]
pub struct ModelDescriptor {
    name: String,
    table: String,
    casts: BTreeMap<String, Cast>,
    scopes: Vec<Arc<dyn Scope>>,
    behaviors: Vec<&'static str>,
    publishable: Option<PublishableColumns>,
}

impl ModelDescriptor {
    /// Descriptor before any behavior has run
    pub(crate) fn from_definition(definition: &ModelDefinition) -> ModelResult<Self> {
        validate_identifier("model", &definition.name)?;
        validate_identifier("table", &definition.table)?;
        for column in definition.casts.keys() {
            validate_identifier("column", column)?;
        }

        Ok(Self {
            name: definition.name.clone(),
            table: definition.table.clone(),
            casts: definition.casts.clone(),
            scopes: Vec::new(),
            behaviors: Vec::new(),
            publishable: None,
        })
    }

    /// Runs one behavior initializer, rejecting duplicates
    pub(crate) fn adopt(&mut self, behavior: &dyn Behavior) -> ModelResult<()> {
        if self.behaviors.contains(&behavior.name()) {
            return Err(ModelError::DuplicateBehavior {
                model: self.name.clone(),
                behavior: behavior.name().to_string(),
            });
        }
        behavior.initialize(self)?;
        self.behaviors.push(behavior.name());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Declared cast for a column
    pub fn cast(&self, column: &str) -> Option<Cast> {
        self.casts.get(column).copied()
    }

    pub fn casts(&self) -> &BTreeMap<String, Cast> {
        &self.casts
    }

    /// Declares a cast unless the column already has one.
    ///
    /// Returns true if the cast was added.
    pub fn cast_if_absent(&mut self, column: &str, cast: Cast) -> bool {
        if self.casts.contains_key(column) {
            return false;
        }
        self.casts.insert(column.to_string(), cast);
        true
    }

    /// Appends a standing scope. A scope name already present is skipped.
    ///
    /// Returns true if the scope was added.
    pub fn add_scope(&mut self, scope: Arc<dyn Scope>) -> bool {
        if self.has_scope(scope.name()) {
            return false;
        }
        self.scopes.push(scope);
        true
    }

    /// Standing scopes in registration order
    pub fn scopes(&self) -> &[Arc<dyn Scope>] {
        &self.scopes
    }

    pub fn has_scope(&self, name: &str) -> bool {
        self.scopes.iter().any(|s| s.name() == name)
    }

    /// Names of adopted behaviors
    pub fn behaviors(&self) -> &[&'static str] {
        &self.behaviors
    }

    /// `table.column`
    pub fn qualify(&self, column: &str) -> String {
        format!("{}.{}", self.table, column)
    }

    /// Strips this model's table prefix; other fields pass through
    pub fn unqualify<'a>(&self, field: &'a str) -> &'a str {
        field
            .strip_prefix(self.table.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(field)
    }

    pub(crate) fn set_publishable(&mut self, columns: PublishableColumns) {
        self.publishable = Some(columns);
    }

    /// Visibility columns, if the model adopted the publishable behavior
    pub fn publishable(&self) -> Option<&PublishableColumns> {
        self.publishable.as_ref()
    }

    /// How the executor compares a column.
    ///
    /// Visibility columns always compare as instants, whatever cast the
    /// definition kept for them.
    pub fn comparison_cast(&self, column: &str) -> Option<Cast> {
        match self.publishable {
            Some(ref c) if c.published_at == column || c.expired_at == column => {
                Some(Cast::Datetime)
            }
            _ => self.cast(column),
        }
    }

    /// Name of the "published at" column
    pub fn published_at_column(&self) -> Option<&str> {
        self.publishable.as_ref().map(|c| c.published_at.as_str())
    }

    /// Name of the "expired at" column
    pub fn expired_at_column(&self) -> Option<&str> {
        self.publishable.as_ref().map(|c| c.expired_at.as_str())
    }

    /// Table-qualified "published at" column
    pub fn qualified_published_at_column(&self) -> Option<String> {
        self.published_at_column().map(|c| self.qualify(c))
    }

    /// Table-qualified "expired at" column
    pub fn qualified_expired_at_column(&self) -> Option<String> {
        self.expired_at_column().map(|c| self.qualify(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Tagged(&'static str);

    impl Scope for Tagged {
        fn name(&self) -> &str {
            self.0
        }

        fn apply(&self, _query: &mut Query, _model: &ModelDescriptor, _now: DateTime<Utc>) {}
    }

    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::from_definition(&ModelDefinition::new("article").with_table("articles"))
            .unwrap()
    }

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("column", "published_at").is_ok());
        assert!(validate_identifier("column", "_hidden2").is_ok());
        assert!(validate_identifier("column", "2fast").is_err());
        assert!(validate_identifier("column", "has space").is_err());
        assert!(validate_identifier("column", "t.col").is_err());
        assert!(validate_identifier("column", "").is_err());
    }

    #[test]
    fn test_invalid_table_rejected() {
        let def = ModelDefinition::new("article").with_table("bad-table");
        let err = ModelDescriptor::from_definition(&def).unwrap_err();
        assert!(matches!(err, ModelError::InvalidIdentifier { kind: "table", .. }));
    }

    #[test]
    fn test_qualify_and_unqualify() {
        let model = descriptor();
        assert_eq!(model.qualify("published_at"), "articles.published_at");
        assert_eq!(model.unqualify("articles.published_at"), "published_at");
        assert_eq!(model.unqualify("published_at"), "published_at");
        assert_eq!(model.unqualify("articles_x.published_at"), "articles_x.published_at");
        assert_eq!(model.unqualify("users.name"), "users.name");
    }

    #[test]
    fn test_add_scope_is_idempotent() {
        let mut model = descriptor();
        assert!(model.add_scope(Arc::new(Tagged("published"))));
        assert!(!model.add_scope(Arc::new(Tagged("published"))));
        assert!(model.add_scope(Arc::new(Tagged("tenant"))));

        let names: Vec<&str> = model.scopes().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["published", "tenant"]);
    }

    #[test]
    fn test_cast_if_absent_keeps_explicit() {
        let def = ModelDefinition::new("article").with_cast("published_at", Cast::String);
        let mut model = ModelDescriptor::from_definition(&def).unwrap();

        assert!(!model.cast_if_absent("published_at", Cast::Datetime));
        assert!(model.cast_if_absent("expired_at", Cast::Datetime));
        assert_eq!(model.cast("published_at"), Some(Cast::String));
        assert_eq!(model.cast("expired_at"), Some(Cast::Datetime));
    }

    #[test]
    fn test_non_publishable_has_no_columns() {
        let model = descriptor();
        assert!(model.publishable().is_none());
        assert!(model.qualified_published_at_column().is_none());
    }
}
