//! Model registry
//!
//! The explicit initialization routine for record types. Registration
//! validates the definition, runs behavior initializers in declaration
//! order and caches the frozen descriptor for the life of the registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::descriptor::{ModelDefinition, ModelDescriptor};
use super::errors::{ModelError, ModelResult};
use crate::observability::{log_event_with_fields, Event};

#[derive(Debug)]
struct Entry {
    signature: String,
    descriptor: Arc<ModelDescriptor>,
}

/// Registry of initialized models
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Entry>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers and initializes a model.
    ///
    /// Registering an identical definition again returns the cached
    /// descriptor. A different definition under the same name fails, so
    /// column names never change once queries may have used them.
    pub fn register(&self, definition: ModelDefinition) -> ModelResult<Arc<ModelDescriptor>> {
        let signature = definition.signature();

        if let Some(existing) = self.lookup(&definition.name) {
            return if existing.0 == signature {
                Ok(existing.1)
            } else {
                Err(ModelError::ConflictingDefinition(definition.name.clone()))
            };
        }

        let mut descriptor = ModelDescriptor::from_definition(&definition)?;
        for behavior in &definition.behaviors {
            descriptor.adopt(behavior.as_ref())?;
        }
        let descriptor = Arc::new(descriptor);

        let mut models = self
            .models
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Another registrant may have won the race since the lookup
        if let Some(existing) = models.get(&definition.name) {
            return if existing.signature == signature {
                Ok(Arc::clone(&existing.descriptor))
            } else {
                Err(ModelError::ConflictingDefinition(definition.name.clone()))
            };
        }

        models.insert(
            definition.name.clone(),
            Entry {
                signature,
                descriptor: Arc::clone(&descriptor),
            },
        );
        drop(models);

        let behaviors = descriptor.behaviors().join(",");
        let scopes: Vec<&str> = descriptor.scopes().iter().map(|s| s.name()).collect();
        let scopes = scopes.join(",");
        log_event_with_fields(
            Event::ModelRegistered,
            &[
                ("model", descriptor.name()),
                ("table", descriptor.table()),
                ("behaviors", behaviors.as_str()),
                ("scopes", scopes.as_str()),
            ],
        );

        Ok(descriptor)
    }

    fn lookup(&self, name: &str) -> Option<(String, Arc<ModelDescriptor>)> {
        self.models.read().ok().and_then(|models| {
            models
                .get(name)
                .map(|e| (e.signature.clone(), Arc::clone(&e.descriptor)))
        })
    }

    /// Gets a registered model
    pub fn get(&self, name: &str) -> ModelResult<Arc<ModelDescriptor>> {
        self.lookup(name)
            .map(|(_, descriptor)| descriptor)
            .ok_or_else(|| ModelError::UnknownModel(name.to_string()))
    }

    /// Checks if a model is registered
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Registered model names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .models
            .read()
            .map(|models| models.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.models.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
