//! Core time-series engine for FloorSight
//!
//! Stores timestamped machine-metric samples from factory producers (MQTT
//! bridges, PLC pollers, energy meters) and answers the dashboard's reads:
//! range queries, hourly/daily/weekly/monthly rollups, trend deltas,
//! latest-value snapshots and storage diagnostics.
//!
//! Key constraints:
//! - Memory stays bounded: a lazy retention sweep evicts samples older than
//!   the horizon once the store crosses its soft capacity trigger
//! - Every read is a pure function of the stored samples and the clock
//! - One explicit store instance per process, passed to producers and
//!   consumers (no global state)
//!
//! ```no_run
//! use std::sync::Arc;
//! use floorsight_core::{MetricType, Sample, StoreConfig, TimeSeriesStore};
//!
//! let store = Arc::new(TimeSeriesStore::with_system_clock(StoreConfig::default())?);
//! let now = store.now();
//!
//! // Producer side
//! store.record(Sample::new("INJ-001", MetricType::Oee, 0.82, now).with_unit("%"))?;
//!
//! // Consumer side
//! let trend = store.trend_analysis("INJ-001", MetricType::Oee, 24)?;
//! println!("OEE is {:?} ({:+.1}%)", trend.trend, trend.change_percent);
//! # Ok::<(), floorsight_core::StoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

// Logging shims so the `log` dependency stays optional
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod errors;
pub mod query;
pub mod sample;
pub mod stats;
pub mod store;
pub mod time;
pub mod trend;

// Public API
pub use aggregate::AggregatedBucket;
pub use calendar::{CalendarZone, Granularity};
pub use config::StoreConfig;
pub use errors::{StoreError, StoreResult};
pub use query::QueryFilter;
pub use sample::{MetricType, Sample};
pub use stats::{MachineSnapshot, StorageStats};
pub use store::TimeSeriesStore;
pub use time::{ManualClock, SystemTime, TimeSource, Timestamp};
pub use trend::{Trend, TrendResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
