//! # Lifecycle Event Dispatcher
//!
//! Synchronous, in-order delivery of model lifecycle events to registered
//! listeners. Listeners are keyed by model name and event.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::event::{ListenerResponse, ModelEvent};
use crate::model::Record;

/// A registered listener
pub type Listener = Arc<dyn Fn(&Record) -> ListenerResponse + Send + Sync>;

/// Dispatcher for model lifecycle events
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<HashMap<(String, ModelEvent), Vec<Listener>>>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(String, usize)> = self
            .listeners
            .read()
            .map(|l| {
                l.iter()
                    .map(|((model, event), v)| (format!("{}.{}", model, event), v.len()))
                    .collect()
            })
            .unwrap_or_default();
        f.debug_struct("EventDispatcher")
            .field("listeners", &counts)
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one model event.
    ///
    /// The closure may return `()`, a `bool` (false cancels) or a
    /// [`ListenerResponse`].
    pub fn listen<F, R>(&self, model: &str, event: ModelEvent, listener: F)
    where
        F: Fn(&Record) -> R + Send + Sync + 'static,
        R: Into<ListenerResponse>,
    {
        let listener: Listener = Arc::new(move |record| listener(record).into());
        // Registration never fails, even on a poisoned map
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry((model.to_string(), event))
            .or_default()
            .push(listener);
    }

    /// Fires a "before" event.
    ///
    /// Listeners run in registration order; the first cancel stops the
    /// chain and the method returns false. "After" events cannot be
    /// cancelled and are dispatched normally.
    pub fn until(&self, event: ModelEvent, record: &Record) -> bool {
        if !event.is_before() {
            self.dispatch(event, record);
            return true;
        }
        for listener in self.snapshot(&record.model, event) {
            if listener(record).is_cancel() {
                return false;
            }
        }
        true
    }

    /// Fires an "after" event. Every listener runs; responses are ignored.
    pub fn dispatch(&self, event: ModelEvent, record: &Record) {
        for listener in self.snapshot(&record.model, event) {
            let _ = listener(record);
        }
    }

    /// Number of listeners for a model event
    pub fn listener_count(&self, model: &str, event: ModelEvent) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(model.to_string(), event))
            .map_or(0, Vec::len)
    }

    /// Removes every listener registered for a model
    pub fn forget(&self, model: &str) {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|(m, _), _| m != model);
    }

    // Cloned out of the lock so listeners may register further listeners
    fn snapshot(&self, model: &str, event: ModelEvent) -> Vec<Listener> {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(model.to_string(), event))
            .cloned()
            .unwrap_or_default()
    }
}
