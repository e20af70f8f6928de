//! Record store contract

use uuid::Uuid;

use super::errors::StorageResult;
use crate::model::{ModelDescriptor, Record};

/// Persistence collaborator.
///
/// Saves are single blocking calls that either succeed or fail; concurrent
/// saves of the same record are last-write-wins.
pub trait RecordStore: Send + Sync {
    /// Inserts or replaces a record in the model's table
    fn save(&self, model: &ModelDescriptor, record: &Record) -> StorageResult<()>;

    /// Loads one record by ID
    fn find(&self, model: &ModelDescriptor, id: Uuid) -> StorageResult<Option<Record>>;

    /// Loads every record of the model's table, in insertion order
    fn all(&self, model: &ModelDescriptor) -> StorageResult<Vec<Record>>;
}
