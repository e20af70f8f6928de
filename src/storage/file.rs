//! JSON file record store
//!
//! All tables live in one JSON document. Every save rewrites the document:
//!
//! 1. Write to `<file>.tmp`
//! 2. fsync the temp file
//! 3. Rename temp over the data file
//!
//! A crash mid-save leaves either the old or the new document, never a mix.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{StorageError, StorageResult};
use super::memory::{check_model, upsert};
use super::store::RecordStore;
use crate::model::{ModelDescriptor, Record};

/// On-disk document shape
#[derive(Debug, Default, Serialize, Deserialize)]
struct DataFile {
    #[serde(default)]
    tables: BTreeMap<String, Vec<Record>>,
}

/// Record store backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    temp_path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens a store at `path`. The file is created on first save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp = path.clone().into_os_string();
        temp.push(".tmp");
        Self {
            path,
            temp_path: PathBuf::from(temp),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the data file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> StorageResult<DataFile> {
        if !self.path.exists() {
            return Ok(DataFile::default());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::io(self.path.display().to_string(), e))?;
        if content.trim().is_empty() {
            return Ok(DataFile::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_atomic(&self, data: &DataFile) -> StorageResult<()> {
        let display = self.path.display().to_string();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(&display, e))?;
            }
        }

        let content = serde_json::to_string_pretty(data)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)
            .map_err(|e| StorageError::io(self.temp_path.display().to_string(), e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| StorageError::io(self.temp_path.display().to_string(), e))?;
        file.sync_all()
            .map_err(|e| StorageError::io(self.temp_path.display().to_string(), e))?;

        fs::rename(&self.temp_path, &self.path).map_err(|e| StorageError::io(&display, e))?;

        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn save(&self, model: &ModelDescriptor, record: &Record) -> StorageResult<()> {
        check_model(model, record)?;

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut data = self.read()?;
        upsert(data.tables.entry(model.table().to_string()).or_default(), record);
        self.write_atomic(&data)
    }

    fn find(&self, model: &ModelDescriptor, id: Uuid) -> StorageResult<Option<Record>> {
        let data = self.read()?;
        Ok(data
            .tables
            .get(model.table())
            .and_then(|rows| rows.iter().find(|r| r.id == id).cloned()))
    }

    fn all(&self, model: &ModelDescriptor) -> StorageResult<Vec<Record>> {
        let mut data = self.read()?;
        Ok(data.tables.remove(model.table()).unwrap_or_default())
    }
}
