//! In-process record store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use uuid::Uuid;

use super::errors::{StorageError, StorageResult};
use super::store::RecordStore;
use crate::model::{ModelDescriptor, Record};

/// Table name → records in insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    read_only: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every subsequent save with [`StorageError::ReadOnly`]
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of records in a table
    pub fn count(&self, table: &str) -> usize {
        self.tables
            .read()
            .map(|t| t.get(table).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

pub(crate) fn check_model(model: &ModelDescriptor, record: &Record) -> StorageResult<()> {
    if record.model != model.name() {
        return Err(StorageError::ModelMismatch {
            id: record.id,
            record_model: record.model.clone(),
            model: model.name().to_string(),
        });
    }
    Ok(())
}

pub(crate) fn upsert(rows: &mut Vec<Record>, record: &Record) {
    match rows.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => *existing = record.clone(),
        None => rows.push(record.clone()),
    }
}

impl RecordStore for MemoryStore {
    fn save(&self, model: &ModelDescriptor, record: &Record) -> StorageResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::ReadOnly);
        }
        check_model(model, record)?;

        let mut tables = self
            .tables
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        upsert(tables.entry(model.table().to_string()).or_default(), record);
        Ok(())
    }

    fn find(&self, model: &ModelDescriptor, id: Uuid) -> StorageResult<Option<Record>> {
        Ok(self.tables.read().ok().and_then(|tables| {
            tables
                .get(model.table())
                .and_then(|rows| rows.iter().find(|r| r.id == id).cloned())
        }))
    }

    fn all(&self, model: &ModelDescriptor) -> StorageResult<Vec<Record>> {
        Ok(self
            .tables
            .read()
            .ok()
            .and_then(|tables| tables.get(model.table()).cloned())
            .unwrap_or_default())
    }
}
