//! Time source abstraction
//!
//! Every query resolution and every publish/expire without an explicit
//! timestamp reads "now" through a [`Clock`], never through an ambient call.
//! Tests substitute a [`FixedClock`] to pin boundary instants.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to an instant until explicitly moved
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at `instant`
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Move the clock to a new instant
    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut current) = self.instant.write() {
            *current = instant;
        }
    }

    /// Advance the clock by `delta`
    pub fn advance(&self, delta: chrono::Duration) {
        if let Ok(mut current) = self.instant.write() {
            *current = *current + delta;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.instant.read() {
            Ok(instant) => *instant,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_stable() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(at);

        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_fixed_clock_set_and_advance() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(at);

        clock.advance(chrono::Duration::days(1));
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());

        let later = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
