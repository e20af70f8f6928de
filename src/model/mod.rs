//! Model subsystem
//!
//! Record types are declared as [`ModelDefinition`]s and initialized by a
//! [`ModelRegistry`]. Initialization is where behaviors attach standing
//! scopes and casts; afterwards a [`ModelDescriptor`] never changes.

mod cast;
mod descriptor;
mod errors;
mod record;
mod registry;

pub use cast::{decode_datetime, encode_datetime, encode_instant, Cast};
pub use descriptor::{validate_identifier, Behavior, ModelDefinition, ModelDescriptor, Scope};
pub use errors::{ModelError, ModelResult};
pub use record::Record;
pub use registry::ModelRegistry;
