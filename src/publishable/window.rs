//! Visibility window of a single record

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::columns::PublishableColumns;
use crate::model::Record;

/// Where a record sits relative to its window at some instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityState {
    /// Never published
    Unpublished,
    /// Publication time is in the future
    Scheduled,
    /// Inside the window
    Published,
    /// Expiry time has passed
    Expired,
}

impl VisibilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityState::Unpublished => "unpublished",
            VisibilityState::Scheduled => "scheduled",
            VisibilityState::Published => "published",
            VisibilityState::Expired => "expired",
        }
    }
}

impl fmt::Display for VisibilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Half-open interval `[published_at, expired_at)`; no expiry is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityWindow {
    pub published_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl VisibilityWindow {
    /// Reads the window from a record's columns
    pub fn of(record: &Record, columns: &PublishableColumns) -> Self {
        Self {
            published_at: record.datetime(&columns.published_at),
            expired_at: record.datetime(&columns.expired_at),
        }
    }

    /// Same predicate the published scope applies in queries
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == VisibilityState::Published
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> VisibilityState {
        match self.published_at {
            None => VisibilityState::Unpublished,
            Some(_) if self.expired_at.map_or(false, |e| e <= now) => VisibilityState::Expired,
            Some(p) if p > now => VisibilityState::Scheduled,
            Some(_) => VisibilityState::Published,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn window(published: Option<DateTime<Utc>>, expired: Option<DateTime<Utc>>) -> VisibilityWindow {
        VisibilityWindow {
            published_at: published,
            expired_at: expired,
        }
    }

    #[test]
    fn test_unpublished_regardless_of_expiry() {
        let now = day(2024, 3, 1);
        assert_eq!(window(None, None).state_at(now), VisibilityState::Unpublished);
        assert_eq!(
            window(None, Some(day(2025, 1, 1))).state_at(now),
            VisibilityState::Unpublished
        );
        assert!(!window(None, Some(day(2025, 1, 1))).is_visible_at(now));
    }

    #[test]
    fn test_window_boundaries() {
        let published = day(2024, 1, 1);
        let expired = day(2024, 6, 1);
        let w = window(Some(published), Some(expired));

        // Start is inclusive, end exclusive
        assert!(w.is_visible_at(published));
        assert!(!w.is_visible_at(expired));
        assert!(w.is_visible_at(day(2024, 3, 1)));
        assert_eq!(w.state_at(day(2024, 7, 1)), VisibilityState::Expired);
        assert_eq!(w.state_at(day(2023, 12, 1)), VisibilityState::Scheduled);
    }

    #[test]
    fn test_unbounded_expiry() {
        let w = window(Some(day(2024, 1, 1)), None);
        assert!(w.is_visible_at(day(2099, 1, 1)));
    }

    #[test]
    fn test_reads_configured_columns() {
        let columns = PublishableColumns::new("live_from", "live_until");
        let record = Record::new("page")
            .with_datetime("live_from", day(2024, 1, 1))
            .with_datetime("published_at", day(2030, 1, 1));

        let w = VisibilityWindow::of(&record, &columns);
        assert_eq!(w.published_at, Some(day(2024, 1, 1)));
        assert_eq!(w.expired_at, None);
    }
}
