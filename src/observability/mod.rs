//! Observability subsystem
//!
//! Structured JSON logging of registration, query resolution and
//! publish / expire outcomes.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. Synchronous, no background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use publishable::observability::{log_event_with_fields, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Warn);
//! log_event_with_fields(Event::ModelRegistered, &[("model", "article")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

fn severity_for(event: Event) -> Severity {
    if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    }
}

/// Log an event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_severity() {
        assert_eq!(severity_for(Event::PersistenceFailed), Severity::Error);
        assert_eq!(severity_for(Event::QueryResolved), Severity::Info);
    }

    #[test]
    fn test_log_event() {
        // Verifies no panic
        log_event_with_fields(Event::ModelRegistered, &[("model", "article")]);
    }
}
