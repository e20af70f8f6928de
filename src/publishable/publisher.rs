//! Publish and expire operations
//!
//! # Sequence (both operations)
//!
//! 1. Fire the "before" event; a cancel returns `Ok(false)` untouched
//! 2. Stamp the timestamp column
//! 3. Save through the store; a failure is returned as-is
//! 4. Fire the "after" event
//! 5. Return `Ok(true)`
//!
//! On a failed save the record keeps the new timestamp in memory but not
//! in the store. Retrying is the caller's decision.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use super::errors::{PublishError, PublishResult};
use super::window::VisibilityWindow;
use crate::clock::Clock;
use crate::events::{EventDispatcher, ListenerResponse, ModelEvent};
use crate::model::{encode_instant, ModelDescriptor, Record};
use crate::observability::{log_event_with_fields, Event};
use crate::storage::RecordStore;

/// Runs publish / expire against a store, clock and event dispatcher
pub struct Publisher {
    clock: Arc<dyn Clock>,
    events: Arc<EventDispatcher>,
    store: Arc<dyn RecordStore>,
}

impl Publisher {
    pub fn new(
        clock: Arc<dyn Clock>,
        events: Arc<EventDispatcher>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            clock,
            events,
            store,
        }
    }

    /// Publishes a record at `at`, or now when `at` is `None`.
    ///
    /// Returns `Ok(false)` if a `publishing` listener cancelled.
    pub fn publish(
        &self,
        model: &ModelDescriptor,
        record: &mut Record,
        at: Option<DateTime<Utc>>,
    ) -> PublishResult<bool> {
        let column = Self::columns(model, record)?.published_at.clone();
        self.transition(model, record, ModelEvent::Publishing, &column, at)
    }

    /// Publishes a record at an explicit instant
    pub fn published_at(
        &self,
        model: &ModelDescriptor,
        record: &mut Record,
        at: DateTime<Utc>,
    ) -> PublishResult<bool> {
        self.publish(model, record, Some(at))
    }

    /// Expires a record at `at`, or now when `at` is `None`.
    ///
    /// Returns `Ok(false)` if an `expiring` listener cancelled.
    pub fn expire(
        &self,
        model: &ModelDescriptor,
        record: &mut Record,
        at: Option<DateTime<Utc>>,
    ) -> PublishResult<bool> {
        let column = Self::columns(model, record)?.expired_at.clone();
        self.transition(model, record, ModelEvent::Expiring, &column, at)
    }

    /// Expires a record at an explicit instant
    pub fn expired_at(
        &self,
        model: &ModelDescriptor,
        record: &mut Record,
        at: DateTime<Utc>,
    ) -> PublishResult<bool> {
        self.expire(model, record, Some(at))
    }

    /// The record's window as currently held in memory
    pub fn window(&self, model: &ModelDescriptor, record: &Record) -> PublishResult<VisibilityWindow> {
        let columns = Self::columns(model, record)?;
        Ok(VisibilityWindow::of(record, columns))
    }

    /// Whether the record is inside its window right now
    pub fn is_visible(&self, model: &ModelDescriptor, record: &Record) -> PublishResult<bool> {
        Ok(self.window(model, record)?.is_visible_at(self.clock.now()))
    }

    fn columns<'m>(
        model: &'m ModelDescriptor,
        record: &Record,
    ) -> PublishResult<&'m super::columns::PublishableColumns> {
        let columns = model
            .publishable()
            .ok_or_else(|| PublishError::NotPublishable(model.name().to_string()))?;
        if record.model != model.name() {
            return Err(PublishError::ModelMismatch {
                id: record.id,
                record_model: record.model.clone(),
                model: model.name().to_string(),
            });
        }
        Ok(columns)
    }

    fn transition(
        &self,
        model: &ModelDescriptor,
        record: &mut Record,
        before: ModelEvent,
        column: &str,
        at: Option<DateTime<Utc>>,
    ) -> PublishResult<bool> {
        let at = at.unwrap_or_else(|| self.clock.now());
        let id = record.id.to_string();
        let event_name = before.as_str();

        if !self.events.until(before, record) {
            log_event_with_fields(
                Event::TransitionCancelled,
                &[("model", model.name()), ("id", id.as_str()), ("event", event_name)],
            );
            return Ok(false);
        }

        record.set(column, encode_instant(model.cast(column), at));

        if let Err(e) = self.store.save(model, record) {
            let reason = e.to_string();
            log_event_with_fields(
                Event::PersistenceFailed,
                &[
                    ("model", model.name()),
                    ("id", id.as_str()),
                    ("event", event_name),
                    ("error", reason.as_str()),
                ],
            );
            return Err(PublishError::Storage(e));
        }

        self.events.dispatch(before.completion(), record);

        let stamped = at.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        log_event_with_fields(
            Event::TransitionComplete,
            &[
                ("model", model.name()),
                ("id", id.as_str()),
                ("event", before.completion().as_str()),
                ("column", column),
                ("at", stamped.as_str()),
            ],
        );

        Ok(true)
    }
}

/// Listener registration for the publishable lifecycle events
pub trait PublishableEvents {
    /// Before publish; return `false` or `ListenerResponse::Cancel` to veto
    fn publishing<F, R>(&self, model: &str, listener: F)
    where
        F: Fn(&Record) -> R + Send + Sync + 'static,
        R: Into<ListenerResponse>;

    /// After a successful publish
    fn published<F, R>(&self, model: &str, listener: F)
    where
        F: Fn(&Record) -> R + Send + Sync + 'static,
        R: Into<ListenerResponse>;

    /// Before expire; return `false` or `ListenerResponse::Cancel` to veto
    fn expiring<F, R>(&self, model: &str, listener: F)
    where
        F: Fn(&Record) -> R + Send + Sync + 'static,
        R: Into<ListenerResponse>;

    /// After a successful expire
    fn expired<F, R>(&self, model: &str, listener: F)
    where
        F: Fn(&Record) -> R + Send + Sync + 'static,
        R: Into<ListenerResponse>;
}

impl PublishableEvents for EventDispatcher {
    fn publishing<F, R>(&self, model: &str, listener: F)
    where
        F: Fn(&Record) -> R + Send + Sync + 'static,
        R: Into<ListenerResponse>,
    {
        self.listen(model, ModelEvent::Publishing, listener);
    }

    fn published<F, R>(&self, model: &str, listener: F)
    where
        F: Fn(&Record) -> R + Send + Sync + 'static,
        R: Into<ListenerResponse>,
    {
        self.listen(model, ModelEvent::Published, listener);
    }

    fn expiring<F, R>(&self, model: &str, listener: F)
    where
        F: Fn(&Record) -> R + Send + Sync + 'static,
        R: Into<ListenerResponse>,
    {
        self.listen(model, ModelEvent::Expiring, listener);
    }

    fn expired<F, R>(&self, model: &str, listener: F)
    where
        F: Fn(&Record) -> R + Send + Sync + 'static,
        R: Into<ListenerResponse>,
    {
        self.listen(model, ModelEvent::Expired, listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::{ModelDefinition, ModelRegistry};
    use crate::publishable::Publishable;
    use crate::storage::{MemoryStore, StorageError};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        model: Arc<ModelDescriptor>,
        store: Arc<MemoryStore>,
        events: Arc<EventDispatcher>,
        publisher: Publisher,
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let model = ModelRegistry::new()
            .register(
                ModelDefinition::new("article")
                    .with_table("articles")
                    .with_behavior(Publishable::new()),
            )
            .unwrap();
        let store = Arc::new(MemoryStore::new());
        let events = Arc::new(EventDispatcher::new());
        let publisher = Publisher::new(
            Arc::new(FixedClock::new(now())),
            Arc::clone(&events),
            store.clone(),
        );
        Fixture {
            model,
            store,
            events,
            publisher,
        }
    }

    #[test]
    fn test_publish_defaults_to_now_and_saves() {
        let f = fixture();
        let mut record = Record::new("article");

        assert!(f.publisher.publish(&f.model, &mut record, None).unwrap());
        assert_eq!(record.datetime("published_at"), Some(now()));

        let stored = f.store.find(&f.model, record.id).unwrap().unwrap();
        assert_eq!(stored.datetime("published_at"), Some(now()));
    }

    #[test]
    fn test_expire_uses_explicit_time() {
        let f = fixture();
        let mut record = Record::new("article");
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        assert!(f.publisher.expired_at(&f.model, &mut record, at).unwrap());
        assert_eq!(record.datetime("expired_at"), Some(at));
        assert!(record.get("published_at").is_none());
    }

    #[test]
    fn test_cancelled_publish_leaves_record_untouched() {
        let f = fixture();
        let after = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&after);
        f.events.publishing("article", |_| false);
        f.events.published("article", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut record = Record::new("article");
        assert!(!f.publisher.publish(&f.model, &mut record, None).unwrap());
        assert!(record.get("published_at").is_none());
        assert_eq!(after.load(Ordering::SeqCst), 0);
        assert_eq!(f.store.count("articles"), 0);
    }

    #[test]
    fn test_persistence_failure_propagates_without_after_event() {
        let f = fixture();
        let after = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&after);
        f.events.expired("article", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        f.store.set_read_only(true);

        let mut record = Record::new("article");
        let err = f.publisher.expire(&f.model, &mut record, None).unwrap_err();

        assert!(err.is_persistence_failure());
        assert!(matches!(err, PublishError::Storage(StorageError::ReadOnly)));
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_not_publishable_model() {
        let f = fixture();
        let plain = ModelRegistry::new()
            .register(ModelDefinition::new("tag"))
            .unwrap();
        let mut record = Record::new("tag");

        let err = f.publisher.publish(&plain, &mut record, None).unwrap_err();
        assert_eq!(err.code(), "PUB_NOT_PUBLISHABLE");
    }

    #[test]
    fn test_record_of_other_model_rejected() {
        let f = fixture();
        let mut record = Record::new("page");

        let err = f.publisher.publish(&f.model, &mut record, None).unwrap_err();
        assert!(matches!(err, PublishError::ModelMismatch { .. }));
        assert!(record.get("published_at").is_none());
    }

    #[test]
    fn test_is_visible_tracks_clock() {
        let f = fixture();
        let mut record = Record::new("article");
        assert!(!f.publisher.is_visible(&f.model, &record).unwrap());

        f.publisher.publish(&f.model, &mut record, None).unwrap();
        assert!(f.publisher.is_visible(&f.model, &record).unwrap());

        f.publisher.expire(&f.model, &mut record, None).unwrap();
        assert!(!f.publisher.is_visible(&f.model, &record).unwrap());
    }
}
