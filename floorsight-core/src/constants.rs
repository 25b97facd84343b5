//! Constants for FloorSight Core
//!
//! Centralized defaults for retention, capacity and trend classification.
//! `StoreConfig::default()` is built from these values; change them there,
//! not at the call sites.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * 60;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = MS_PER_MINUTE * 60;

/// Milliseconds per day.
pub const MS_PER_DAY: u64 = MS_PER_HOUR * 24;

// ===== RETENTION =====

/// Default retention horizon (days).
///
/// Samples older than `now - 30 days` are evicted by the retention sweep.
/// Monthly rollups of the current month stay complete for any month shorter
/// than the horizon.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Default soft capacity (samples).
///
/// Not a hard cap: the store never refuses a sample. Crossing
/// `soft_capacity × cleanup_threshold` triggers the retention sweep.
///
/// 100,000 samples ≈ 6 machines × 6 metrics at one reading every ~2 minutes
/// over 30 days.
pub const DEFAULT_SOFT_CAPACITY: usize = 100_000;

/// Default cleanup trigger as a fraction of soft capacity.
pub const DEFAULT_CLEANUP_THRESHOLD: f64 = 0.8;

// ===== TREND ANALYSIS =====

/// Half-width of the "stable" band (percent).
///
/// `|change| <= 5%` is reported as stable.
pub const STABLE_BAND_PERCENT: f64 = 5.0;

// ===== SNAPSHOTS =====

/// Value reported for a metric that has no samples yet.
pub const MISSING_METRIC_VALUE: f64 = 0.0;
