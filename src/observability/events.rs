//! Observable events
//!
//! Every log line names one of these events.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,
    /// A model finished registration
    ModelRegistered,

    // Queries
    /// Standing scopes applied to a query
    QueryResolved,

    // Publish / expire
    /// Publish or expire saved and announced
    TransitionComplete,
    /// A before-listener vetoed publish or expire
    TransitionCancelled,
    /// The store rejected a publish or expire
    PersistenceFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ModelRegistered => "MODEL_REGISTERED",
            Event::QueryResolved => "QUERY_RESOLVED",
            Event::TransitionComplete => "TRANSITION_COMPLETE",
            Event::TransitionCancelled => "TRANSITION_CANCELLED",
            Event::PersistenceFailed => "PERSISTENCE_FAILED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::PersistenceFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
