//! Time management for the store
//!
//! Provides the clock abstraction the store reads "now" from:
//! - System clock (wall time, milliseconds since the Unix epoch)
//! - Manual clock (tests, replays, simulators driving their own timeline)
//!
//! Retention cutoffs and trend windows are both relative to the injected clock,
//! so a store fed from a replayed log behaves the same as one fed live.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::constants::{MS_PER_DAY, MS_PER_HOUR};

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Source of time for the store
///
/// Implementations must be shareable across producer and consumer threads.
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// System wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Manually driven time source
///
/// Shared through an `Arc` so a test can hand one clone to the store and keep
/// advancing the other.
#[derive(Debug, Default)]
pub struct ManualClock {
    timestamp: AtomicU64,
}

impl ManualClock {
    /// Clock pinned at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: AtomicU64::new(timestamp),
        }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.store(timestamp, Ordering::SeqCst);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.timestamp.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.timestamp.load(Ordering::SeqCst)
    }
}

/// Convert a whole number of hours to milliseconds
pub const fn hours_to_ms(hours: u32) -> u64 {
    hours as u64 * MS_PER_HOUR
}

/// Convert a whole number of days to milliseconds
pub const fn days_to_ms(days: u32) -> u64 {
    days as u64 * MS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance(500);
        assert_eq!(clock.now(), 1500);

        clock.set(42);
        assert_eq!(clock.now(), 42);
    }

    #[test]
    fn shared_clock_sees_updates() {
        let clock = Arc::new(ManualClock::new(0));
        let handle: Arc<dyn TimeSource> = clock.clone();

        clock.advance(hours_to_ms(2));
        assert_eq!(handle.now(), 7_200_000);
    }

    #[test]
    fn system_time_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemTime.now() > 1_577_836_800_000);
    }

    #[test]
    fn day_conversion() {
        assert_eq!(days_to_ms(30), 2_592_000_000);
    }
}
