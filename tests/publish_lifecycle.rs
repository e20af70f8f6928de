//! Publish Lifecycle Tests
//!
//! Publish and expire through the public API:
//! - Before listeners can veto; after listeners fire only on success
//! - Repeated publishes are not deduplicated
//! - Expiring now removes the record from default queries
//! - Saves go through the configured store

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use publishable::clock::{Clock, FixedClock};
use publishable::events::{EventDispatcher, ListenerResponse};
use publishable::executor::QueryExecutor;
use publishable::model::{Cast, ModelDefinition, ModelDescriptor, ModelRegistry, Record};
use publishable::publishable::{
    PublishError, Publishable, PublishableEvents, PublishableQueryExt, Publisher, VisibilityState,
};
use publishable::query::Query;
use publishable::storage::{JsonFileStore, MemoryStore, RecordStore, StorageError};

// =============================================================================
// Helper Functions
// =============================================================================

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

struct Harness {
    model: Arc<ModelDescriptor>,
    clock: Arc<FixedClock>,
    events: Arc<EventDispatcher>,
    store: Arc<MemoryStore>,
    publisher: Publisher,
    executor: QueryExecutor,
}

fn harness() -> Harness {
    let model = ModelRegistry::new()
        .register(
            ModelDefinition::new("article")
                .with_table("articles")
                .with_behavior(Publishable::new()),
        )
        .unwrap();
    let clock = Arc::new(FixedClock::new(day(2024, 3, 1)));
    let events = Arc::new(EventDispatcher::new());
    let store = Arc::new(MemoryStore::new());
    let publisher = Publisher::new(clock.clone(), Arc::clone(&events), store.clone());
    let executor = QueryExecutor::new(clock.clone());

    Harness {
        model,
        clock,
        events,
        store,
        publisher,
        executor,
    }
}

/// Records every event name in firing order
fn record_events(h: &Harness) -> Arc<Mutex<Vec<&'static str>>> {
    let log = Arc::new(Mutex::new(Vec::new()));

    let l = Arc::clone(&log);
    h.events.publishing("article", move |_| l.lock().unwrap().push("publishing"));
    let l = Arc::clone(&log);
    h.events.published("article", move |_| l.lock().unwrap().push("published"));
    let l = Arc::clone(&log);
    h.events.expiring("article", move |_| l.lock().unwrap().push("expiring"));
    let l = Arc::clone(&log);
    h.events.expired("article", move |_| l.lock().unwrap().push("expired"));

    log
}

fn visible(h: &Harness) -> usize {
    h.executor
        .fetch(h.store.as_ref(), &Query::new("articles"), &h.model)
        .unwrap()
        .len()
}

// =============================================================================
// Event Ordering Tests
// =============================================================================

#[test]
fn test_publish_fires_before_then_after() {
    let h = harness();
    let log = record_events(&h);
    let mut record = Record::new("article");

    assert!(h.publisher.publish(&h.model, &mut record, None).unwrap());
    assert_eq!(*log.lock().unwrap(), vec!["publishing", "published"]);
}

#[test]
fn test_publish_twice_is_not_deduplicated() {
    let h = harness();
    let log = record_events(&h);
    let mut record = Record::new("article");
    let t = day(2024, 1, 1);

    assert!(h.publisher.published_at(&h.model, &mut record, t).unwrap());
    assert!(h.publisher.published_at(&h.model, &mut record, t).unwrap());

    assert_eq!(record.datetime("published_at"), Some(t));
    assert_eq!(
        *log.lock().unwrap(),
        vec!["publishing", "published", "publishing", "published"]
    );
}

#[test]
fn test_cancel_keeps_timestamp_and_skips_after_event() {
    let h = harness();
    let log = record_events(&h);
    h.events
        .publishing("article", |_| ListenerResponse::Cancel);

    let original = day(2023, 12, 1);
    let mut record = Record::new("article").with_datetime("published_at", original);

    assert!(!h.publisher.publish(&h.model, &mut record, None).unwrap());
    assert_eq!(record.datetime("published_at"), Some(original));
    assert_eq!(*log.lock().unwrap(), vec!["publishing"]);
    assert!(h.store.find(&h.model, record.id).unwrap().is_none());
}

#[test]
fn test_first_cancel_stops_later_listeners() {
    let h = harness();
    let reached = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&reached);

    h.events.expiring("article", |_| false);
    h.events.expiring("article", move |_| *flag.lock().unwrap() = true);

    let mut record = Record::new("article");
    assert!(!h.publisher.expire(&h.model, &mut record, None).unwrap());
    assert!(!*reached.lock().unwrap());
    assert!(record.get("expired_at").is_none());
}

#[test]
fn test_listeners_of_other_models_do_not_fire() {
    let h = harness();
    h.events.publishing("page", |_| false);

    let mut record = Record::new("article");
    assert!(h.publisher.publish(&h.model, &mut record, None).unwrap());
}

#[test]
fn test_listener_sees_stamped_record_after_publish() {
    let h = harness();
    let seen = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&seen);
    h.events.published("article", move |r| {
        *slot.lock().unwrap() = r.datetime("published_at");
    });

    let mut record = Record::new("article");
    h.publisher.publish(&h.model, &mut record, None).unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(day(2024, 3, 1)));
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_failed_save_skips_after_event() {
    let h = harness();
    let log = record_events(&h);
    h.store.set_read_only(true);

    let mut record = Record::new("article");
    let err = h.publisher.publish(&h.model, &mut record, None).unwrap_err();

    assert!(matches!(err, PublishError::Storage(StorageError::ReadOnly)));
    assert_eq!(*log.lock().unwrap(), vec!["publishing"]);
    // The in-memory record keeps the attempted timestamp
    assert_eq!(record.datetime("published_at"), Some(day(2024, 3, 1)));
    assert_eq!(h.store.count("articles"), 0);
}

#[test]
fn test_file_store_round_trip_keeps_window() {
    let tmp = TempDir::new().unwrap();
    let h = harness();
    let store = Arc::new(JsonFileStore::open(tmp.path().join("records.json")));
    let publisher = Publisher::new(h.clock.clone(), Arc::clone(&h.events), store.clone());

    let mut record = Record::new("article");
    publisher
        .published_at(&h.model, &mut record, day(2024, 1, 1))
        .unwrap();
    publisher
        .expired_at(&h.model, &mut record, day(2024, 6, 1))
        .unwrap();

    let reopened = JsonFileStore::open(tmp.path().join("records.json"));
    let stored = reopened.find(&h.model, record.id).unwrap().unwrap();
    assert_eq!(stored.datetime("published_at"), Some(day(2024, 1, 1)));
    assert_eq!(stored.datetime("expired_at"), Some(day(2024, 6, 1)));

    let march = h
        .executor
        .fetch(&reopened, &Query::new("articles"), &h.model)
        .unwrap();
    assert_eq!(march.ids(), vec![record.id]);
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_expire_now_hides_from_that_instant() {
    let h = harness();
    let mut record = Record::new("article");
    h.publisher
        .published_at(&h.model, &mut record, day(2024, 1, 1))
        .unwrap();
    assert_eq!(visible(&h), 1);

    assert!(h.publisher.expire(&h.model, &mut record, None).unwrap());
    assert_eq!(record.datetime("expired_at"), Some(h.clock.now()));
    assert_eq!(visible(&h), 0);

    h.clock.advance(Duration::days(30));
    assert_eq!(visible(&h), 0);

    let all = h
        .executor
        .fetch(
            h.store.as_ref(),
            &Query::new("articles").with_not_published(),
            &h.model,
        )
        .unwrap();
    assert_eq!(all.ids(), vec![record.id]);
}

#[test]
fn test_scheduled_record_appears_when_clock_reaches_it() {
    let h = harness();
    let mut record = Record::new("article");
    h.publisher
        .published_at(&h.model, &mut record, day(2024, 4, 1))
        .unwrap();

    let window = h.publisher.window(&h.model, &record).unwrap();
    assert_eq!(window.state_at(h.clock.now()), VisibilityState::Scheduled);
    assert_eq!(visible(&h), 0);

    h.clock.set(day(2024, 4, 1));
    assert_eq!(visible(&h), 1);
    assert!(h.publisher.is_visible(&h.model, &record).unwrap());
}

#[test]
fn test_publish_into_integer_column_stores_unix_seconds() {
    let h = harness();
    let model = ModelRegistry::new()
        .register(
            ModelDefinition::new("page")
                .with_cast("published_at", Cast::Integer)
                .with_behavior(Publishable::new()),
        )
        .unwrap();

    let mut record = Record::new("page");
    h.publisher
        .published_at(&model, &mut record, day(2024, 1, 1))
        .unwrap();

    assert_eq!(record.get("published_at"), Some(&serde_json::json!(1704067200)));
    assert_eq!(record.datetime("published_at"), Some(day(2024, 1, 1)));

    let visible = h
        .executor
        .fetch(h.store.as_ref(), &Query::new("page"), &model)
        .unwrap();
    assert_eq!(visible.ids(), vec![record.id]);
}
