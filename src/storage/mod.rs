//! Record storage
//!
//! The persistence collaborator the publishable behavior saves through.
//! Two reference stores ship with the crate:
//!
//! - [`MemoryStore`]: in-process tables, switchable to read-only
//! - [`JsonFileStore`]: one JSON document, rewritten atomically per save

mod errors;
mod file;
mod memory;
mod store;

pub use errors::{StorageError, StorageResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::RecordStore;
