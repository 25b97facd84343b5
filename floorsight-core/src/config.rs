//! Store configuration
//!
//! Fixed at construction. Defaults come from [`crate::constants`]; overrides
//! are chained with `with_*` or deserialized from JSON:
//!
//! ```rust
//! use floorsight_core::{StoreConfig, CalendarZone};
//!
//! let config = StoreConfig::default()
//!     .with_retention_days(7)
//!     .with_tracked_machines(["INJ-001", "INJ-002"])
//!     .with_zone(CalendarZone::Utc);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.cleanup_trigger(), 80_000);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarZone;
use crate::constants::{DEFAULT_CLEANUP_THRESHOLD, DEFAULT_RETENTION_DAYS, DEFAULT_SOFT_CAPACITY};
use crate::errors::{StoreError, StoreResult};
use crate::time::days_to_ms;

/// Construction-time settings for a [`crate::TimeSeriesStore`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreConfig {
    /// Samples older than this many days are evicted by the sweep
    pub retention_days: u32,
    /// Nominal sample budget
    pub soft_capacity: usize,
    /// Fraction of `soft_capacity` that triggers the retention sweep
    pub cleanup_threshold: f64,
    /// Reject non-finite values and blank machine ids on ingestion
    pub strict_validation: bool,
    /// Machines reported by `current_metrics_by_machine`; empty means
    /// "every machine in the store"
    pub tracked_machines: Vec<String>,
    /// Calendar used for bucket floors
    pub zone: CalendarZone,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            soft_capacity: DEFAULT_SOFT_CAPACITY,
            cleanup_threshold: DEFAULT_CLEANUP_THRESHOLD,
            strict_validation: true,
            tracked_machines: Vec::new(),
            zone: CalendarZone::Local,
        }
    }
}

impl StoreConfig {
    /// Set the retention horizon (days)
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Set the nominal sample budget
    pub fn with_soft_capacity(mut self, capacity: usize) -> Self {
        self.soft_capacity = capacity;
        self
    }

    /// Set the sweep trigger as a fraction of soft capacity
    pub fn with_cleanup_threshold(mut self, threshold: f64) -> Self {
        self.cleanup_threshold = threshold;
        self
    }

    /// Toggle ingestion validation
    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    /// Set the snapshot roster; repeated ids are kept once, first position wins
    pub fn with_tracked_machines<I, S>(mut self, machines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster: Vec<String> = Vec::new();
        for machine in machines.into_iter().map(Into::into) {
            if !roster.contains(&machine) {
                roster.push(machine);
            }
        }
        self.tracked_machines = roster;
        self
    }

    /// Set the calendar used for bucket floors
    pub fn with_zone(mut self, zone: CalendarZone) -> Self {
        self.zone = zone;
        self
    }

    /// Reject settings that cannot bound memory
    pub fn validate(&self) -> StoreResult<()> {
        if self.retention_days == 0 {
            return Err(StoreError::Config("retention_days must be at least 1"));
        }
        if self.soft_capacity == 0 {
            return Err(StoreError::Config("soft_capacity must be at least 1"));
        }
        if !(self.cleanup_threshold > 0.0 && self.cleanup_threshold <= 1.0) {
            return Err(StoreError::Config("cleanup_threshold must be in (0, 1]"));
        }
        if !self.zone.is_valid() {
            return Err(StoreError::Config("zone offset must be within ±24h"));
        }
        Ok(())
    }

    /// Retention horizon in milliseconds
    pub fn retention_ms(&self) -> u64 {
        days_to_ms(self.retention_days)
    }

    /// Sample count above which `record` runs the retention sweep
    pub fn cleanup_trigger(&self) -> usize {
        (self.soft_capacity as f64 * self.cleanup_threshold) as usize
    }
}
