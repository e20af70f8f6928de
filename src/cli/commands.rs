//! CLI command implementations
//!
//! Each command loads the configuration, opens the JSON file store named
//! there, performs one operation and returns the response payload.
//! `run_command` turns the payload or error into a single stdout object.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::clock::{Clock, FixedClock, SystemClock};
use crate::config::{self, LoadedConfig};
use crate::events::EventDispatcher;
use crate::executor::QueryExecutor;
use crate::model::{encode_datetime, ModelDescriptor, Record};
use crate::publishable::{PublishableQueryExt, Publisher, VisibilityWindow};
use crate::query::Query;
use crate::storage::{JsonFileStore, RecordStore};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and write its JSON response
pub fn run_command(cmd: Command) -> CliResult<()> {
    let outcome = match cmd {
        Command::Check { config } => check(&config),
        Command::List {
            config,
            model,
            with_not_published,
            now,
        } => list(&config, &model, with_not_published, now.as_deref()),
        Command::Publish {
            config,
            model,
            id,
            at,
        } => publish(&config, &model, &id, at.as_deref()),
        Command::Expire {
            config,
            model,
            id,
            at,
        } => expire(&config, &model, &id, at.as_deref()),
        Command::Explain {
            config,
            model,
            with_not_published,
            now,
        } => explain(&config, &model, with_not_published, now.as_deref()),
    };

    match outcome {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Load the configuration and describe every registered model
pub fn check(config_path: &Path) -> CliResult<Value> {
    let loaded = config::load(config_path)?;

    let mut models = Vec::new();
    for name in loaded.registry.names() {
        let model = loaded.registry.get(&name)?;
        models.push(describe_model(&model));
    }

    Ok(json!({
        "data_file": loaded.data_file.display().to_string(),
        "models": models,
    }))
}

/// List the records of a model that pass its standing scopes
pub fn list(
    config_path: &Path,
    model_name: &str,
    with_not_published: bool,
    now: Option<&str>,
) -> CliResult<Value> {
    let loaded = config::load(config_path)?;
    let model = loaded.registry.get(model_name)?;
    let clock = clock_at(now)?;
    let store = JsonFileStore::open(&loaded.data_file);

    let query = model_query(&model, with_not_published);
    let result = QueryExecutor::new(clock).fetch(&store, &query, &model)?;

    let records: Vec<Value> = result
        .records
        .iter()
        .map(|r| record_view(&model, r, result.now))
        .collect();

    Ok(json!({
        "model": model.name(),
        "now": encode_datetime(result.now),
        "with_not_published": with_not_published,
        "scanned": result.scanned_count,
        "count": result.returned_count,
        "records": records,
    }))
}

/// Publish a stored record
pub fn publish(config_path: &Path, model_name: &str, id: &str, at: Option<&str>) -> CliResult<Value> {
    transition(config_path, model_name, id, at, Transition::Publish)
}

/// Expire a stored record
pub fn expire(config_path: &Path, model_name: &str, id: &str, at: Option<&str>) -> CliResult<Value> {
    transition(config_path, model_name, id, at, Transition::Expire)
}

/// Resolve a model's query and render it without touching storage
pub fn explain(
    config_path: &Path,
    model_name: &str,
    with_not_published: bool,
    now: Option<&str>,
) -> CliResult<Value> {
    let loaded = config::load(config_path)?;
    let model = loaded.registry.get(model_name)?;
    let clock = clock_at(now)?;

    let query = model_query(&model, with_not_published);
    let plan = QueryExecutor::new(clock).resolve(&query, &model)?.explain();

    let mut data = serde_json::to_value(&plan)?;
    if let Value::Object(ref mut map) = data {
        map.insert("sql".to_string(), Value::String(plan.to_string()));
    }
    Ok(data)
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    Publish,
    Expire,
}

impl Transition {
    fn as_str(&self) -> &'static str {
        match self {
            Transition::Publish => "publish",
            Transition::Expire => "expire",
        }
    }
}

fn transition(
    config_path: &Path,
    model_name: &str,
    id: &str,
    at: Option<&str>,
    kind: Transition,
) -> CliResult<Value> {
    let LoadedConfig {
        data_file,
        registry,
        ..
    } = config::load(config_path)?;
    let model = registry.get(model_name)?;
    let record_id = parse_uuid(id)?;
    let at = at.map(parse_instant).transpose()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(JsonFileStore::open(data_file));
    let mut record = store
        .find(&model, record_id)?
        .ok_or_else(|| CliError::record_not_found(model.name(), id))?;

    let publisher = Publisher::new(Arc::clone(&clock), Arc::new(EventDispatcher::new()), store);
    let applied = match kind {
        Transition::Publish => publisher.publish(&model, &mut record, at)?,
        Transition::Expire => publisher.expire(&model, &mut record, at)?,
    };

    let mut data = record_view(&model, &record, clock.now());
    if let Value::Object(ref mut map) = data {
        map.insert("operation".to_string(), json!(kind.as_str()));
        map.insert("applied".to_string(), json!(applied));
    }
    Ok(data)
}

fn model_query(model: &ModelDescriptor, with_not_published: bool) -> Query {
    let query = Query::new(model.table());
    if with_not_published {
        query.with_not_published()
    } else {
        query
    }
}

fn describe_model(model: &ModelDescriptor) -> Value {
    let scopes: Vec<&str> = model.scopes().iter().map(|s| s.name()).collect();
    let casts: serde_json::Map<String, Value> = model
        .casts()
        .iter()
        .map(|(column, cast)| (column.clone(), json!(cast.as_str())))
        .collect();

    json!({
        "name": model.name(),
        "table": model.table(),
        "behaviors": model.behaviors(),
        "scopes": scopes,
        "casts": casts,
        "publishable": model.publishable(),
    })
}

fn record_view(model: &ModelDescriptor, record: &Record, now: DateTime<Utc>) -> Value {
    let mut view = json!({
        "id": record.id.to_string(),
        "attributes": record.to_document(),
    });
    if let (Some(columns), Value::Object(map)) = (model.publishable(), &mut view) {
        let state = VisibilityWindow::of(record, columns).state_at(now);
        map.insert("state".to_string(), json!(state.as_str()));
    }
    view
}

fn clock_at(now: Option<&str>) -> CliResult<Arc<dyn Clock>> {
    Ok(match now {
        Some(s) => Arc::new(FixedClock::new(parse_instant(s)?)),
        None => Arc::new(SystemClock),
    })
}

fn parse_instant(s: &str) -> CliResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CliError::invalid_argument(format!("Invalid RFC 3339 instant '{}': {}", s, e)))
}

fn parse_uuid(s: &str) -> CliResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| CliError::invalid_argument(format!("Invalid id '{}': {}", s, e)))
}
