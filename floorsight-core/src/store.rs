//! In-Memory Time-Series Store
//!
//! ## Overview
//!
//! `TimeSeriesStore` owns every sample ingested by producers (device bridges,
//! simulators) and serves the read side used by dashboards: range queries,
//! calendar rollups, trends, latest-value snapshots and storage diagnostics.
//!
//! ## Storage Layout
//!
//! Samples live in a `BTreeMap` keyed by `(timestamp, sequence)`:
//!
//! ```text
//! (1000, 0) -> INJ-001 fire_rate 12.0
//! (1000, 3) -> INJ-002 oee       0.81    <- same instant, inserted later
//! (1500, 1) -> INJ-001 fire_rate 12.4
//! (1500, 2) -> INJ-001 oee       0.79
//! ```
//!
//! - Range scans are an index walk, already in timestamp order
//! - Equal timestamps keep insertion order through the sequence number
//! - Out-of-order arrivals land in their correct position
//! - "Is anything older than the horizon?" is a look at the first key
//!
//! ## Retention
//!
//! The store never refuses a sample for capacity. After each `record` (or
//! batch), if the count exceeds `soft_capacity × cleanup_threshold`, every
//! sample older than `now - retention_days` is evicted in one `split_off`.
//! The trigger check is O(1); the sweep only pays when something is stale.
//!
//! ## Concurrency
//!
//! One `Mutex` guards the whole collection. Writes are bursty and reads are
//! occasional full scans, and both aggregation and eviction need a consistent
//! view of the entire set. Share the store as `Arc<TimeSeriesStore>`.
//!
//! ```rust
//! use std::sync::Arc;
//! use floorsight_core::{
//!     CalendarZone, Granularity, ManualClock, MetricType, QueryFilter, Sample, StoreConfig,
//!     TimeSeriesStore,
//! };
//!
//! let clock = Arc::new(ManualClock::new(1_709_510_400_000));
//! let store = TimeSeriesStore::new(StoreConfig::default().with_zone(CalendarZone::Utc), clock)?;
//!
//! store.record(Sample::new("INJ-001", MetricType::FireRate, 118.0, 1_709_510_400_000))?;
//! store.record(Sample::new("INJ-001", MetricType::FireRate, 122.0, 1_709_510_460_000))?;
//!
//! let filter = QueryFilter::range(1_709_510_400_000, 1_709_514_000_000).machines(["INJ-001"]);
//! let hourly = store.aggregate(&filter, Granularity::Hourly)?;
//! assert_eq!(hourly[0].avg, 120.0);
//! # Ok::<(), floorsight_core::StoreError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::aggregate::{aggregate_samples, AggregatedBucket};
use crate::calendar::Granularity;
use crate::config::StoreConfig;
use crate::constants::MISSING_METRIC_VALUE;
use crate::errors::{StoreError, StoreResult};
use crate::query::QueryFilter;
use crate::sample::{MetricType, Sample};
use crate::stats::{MachineSnapshot, StorageStats};
use crate::time::{hours_to_ms, SystemTime, TimeSource, Timestamp};
use crate::trend::TrendResult;

type SampleKey = (Timestamp, u64);

/// State behind the store lock
#[derive(Debug, Default)]
struct StoreInner {
    samples: BTreeMap<SampleKey, Sample>,
    next_seq: u64,
    sweeps: u64,
    evicted_total: u64,
}

impl StoreInner {
    fn insert(&mut self, sample: Sample) {
        let key = (sample.timestamp, self.next_seq);
        self.next_seq += 1;
        self.samples.insert(key, sample);
    }

    /// Samples with `start <= timestamp <= end`, ascending, ties in insertion order
    fn range(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> impl DoubleEndedIterator<Item = &Sample> + '_ {
        self.samples
            .range((start, 0)..=(end, u64::MAX))
            .map(|(_, sample)| sample)
    }

    /// Drop every sample with `timestamp < cutoff`, returning how many went
    fn evict_before(&mut self, cutoff: Timestamp) -> usize {
        match self.samples.first_key_value() {
            Some(((oldest, _), _)) if *oldest < cutoff => {}
            _ => return 0,
        }

        let retained = self.samples.split_off(&(cutoff, 0));
        let evicted = self.samples.len();
        self.samples = retained;

        self.sweeps += 1;
        self.evicted_total += evicted as u64;
        evicted
    }
}

/// Thread-safe in-memory store for machine metric samples
pub struct TimeSeriesStore {
    config: StoreConfig,
    clock: Arc<dyn TimeSource>,
    inner: Mutex<StoreInner>,
}

impl core::fmt::Debug for TimeSeriesStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimeSeriesStore")
            .field("config", &self.config)
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}

impl TimeSeriesStore {
    /// Build an empty store reading "now" from `clock`
    pub fn new(config: StoreConfig, clock: Arc<dyn TimeSource>) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            inner: Mutex::new(StoreInner::default()),
        })
    }

    /// Build an empty store on the system wall clock
    pub fn with_system_clock(config: StoreConfig) -> StoreResult<Self> {
        Self::new(config, Arc::new(SystemTime))
    }

    /// Settings the store was built with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreInner>> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn admit(&self, sample: &Sample) -> StoreResult<()> {
        if !self.config.strict_validation {
            return Ok(());
        }
        sample.validate().map_err(|err| {
            log_warn!("rejected sample from {:?} ({}): {}", sample.machine_id, sample.metric, err);
            err
        })
    }

    /// Lazy retention trigger, run after every write
    fn enforce_retention(&self, inner: &mut StoreInner) -> usize {
        if inner.samples.len() <= self.config.cleanup_trigger() {
            return 0;
        }
        self.sweep(inner)
    }

    fn sweep(&self, inner: &mut StoreInner) -> usize {
        let cutoff = self.now().saturating_sub(self.config.retention_ms());
        let evicted = inner.evict_before(cutoff);
        if evicted > 0 {
            log_debug!(
                "retention sweep evicted {} samples older than {} ({} remain)",
                evicted,
                cutoff,
                inner.samples.len()
            );
        }
        evicted
    }

    /// Ingest one sample
    ///
    /// With strict validation a non-finite value or blank machine id is
    /// rejected and nothing is stored.
    pub fn record(&self, sample: Sample) -> StoreResult<()> {
        self.admit(&sample)?;

        let mut inner = self.lock()?;
        inner.insert(sample);
        self.enforce_retention(&mut inner);
        Ok(())
    }

    /// Ingest a batch under one lock acquisition
    ///
    /// The batch is validated up front and stored all-or-nothing. Returns the
    /// number of samples stored.
    pub fn record_batch<I>(&self, samples: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = Sample>,
    {
        let samples: Vec<Sample> = samples.into_iter().collect();
        for sample in &samples {
            self.admit(sample)?;
        }

        let stored = samples.len();
        let mut inner = self.lock()?;
        for sample in samples {
            inner.insert(sample);
        }
        self.enforce_retention(&mut inner);
        Ok(stored)
    }

    /// Pre-populate the store (demo data, replayed history)
    ///
    /// Same rules as `record_batch`.
    pub fn seed<I>(&self, samples: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = Sample>,
    {
        let stored = self.record_batch(samples)?;
        log_debug!("seeded store with {} samples", stored);
        Ok(stored)
    }

    /// Run the retention sweep now, regardless of the capacity trigger
    pub fn evict_expired(&self) -> StoreResult<usize> {
        let mut inner = self.lock()?;
        Ok(self.sweep(&mut inner))
    }

    /// Samples matching `filter`, ascending by timestamp
    ///
    /// Equal timestamps come back in insertion order.
    pub fn query(&self, filter: &QueryFilter) -> StoreResult<Vec<Sample>> {
        filter.check()?;

        let inner = self.lock()?;
        Ok(inner
            .range(filter.start, filter.end)
            .filter(|sample| filter.matches_series(sample))
            .cloned()
            .collect())
    }

    /// Bucketed statistics for the samples matching `filter`
    pub fn aggregate(
        &self,
        filter: &QueryFilter,
        granularity: Granularity,
    ) -> StoreResult<Vec<AggregatedBucket>> {
        filter.check()?;

        let inner = self.lock()?;
        let matching = inner
            .range(filter.start, filter.end)
            .filter(|sample| filter.matches_series(sample));
        Ok(aggregate_samples(matching, granularity, self.config.zone))
    }

    /// Change between the oldest and newest sample of one series over the
    /// last `lookback_hours`
    pub fn trend_analysis(
        &self,
        machine_id: &str,
        metric: MetricType,
        lookback_hours: u32,
    ) -> StoreResult<TrendResult> {
        let now = self.now();
        let start = now.saturating_sub(hours_to_ms(lookback_hours));

        let inner = self.lock()?;
        let mut window = inner
            .range(start, now)
            .filter(|sample| sample.machine_id == machine_id && sample.metric == metric);

        let result = match (window.next(), window.last()) {
            (None, _) => TrendResult::empty(),
            (Some(only), None) => TrendResult::single(only.value),
            (Some(first), Some(last)) => TrendResult::between(first.value, last.value),
        };
        Ok(result)
    }

    /// Most recent sample of one series, if any
    pub fn latest(&self, machine_id: &str, metric: MetricType) -> StoreResult<Option<Sample>> {
        let inner = self.lock()?;
        Ok(inner
            .samples
            .values()
            .rev()
            .find(|sample| sample.machine_id == machine_id && sample.metric == metric)
            .cloned())
    }

    /// Latest value of every metric for each tracked machine
    ///
    /// Follows the configured roster order, one entry per distinct id. With an
    /// empty roster every machine in the store is reported, sorted by id.
    /// Metrics with no samples read 0.
    pub fn current_metrics_by_machine(&self) -> StoreResult<Vec<MachineSnapshot>> {
        let inner = self.lock()?;
        let roster = &self.config.tracked_machines;
        let wanted: Option<BTreeSet<&str>> = if roster.is_empty() {
            None
        } else {
            Some(roster.iter().map(String::as_str).collect())
        };
        let target = wanted
            .as_ref()
            .map(|machines| machines.len() * MetricType::ALL.len());

        let mut latest: BTreeMap<(&str, MetricType), f64> = BTreeMap::new();
        for sample in inner.samples.values().rev() {
            let machine = sample.machine_id.as_str();
            if wanted.as_ref().map_or(true, |machines| machines.contains(machine)) {
                latest.entry((machine, sample.metric)).or_insert(sample.value);
                if target == Some(latest.len()) {
                    break;
                }
            }
        }

        let machines: Vec<&str> = match &wanted {
            Some(_) => {
                let mut seen = BTreeSet::new();
                roster
                    .iter()
                    .map(String::as_str)
                    .filter(|machine| seen.insert(*machine))
                    .collect()
            }
            None => latest
                .keys()
                .map(|(machine, _)| *machine)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };

        Ok(machines
            .into_iter()
            .map(|machine| MachineSnapshot {
                machine_id: machine.to_string(),
                metrics: MetricType::ALL
                    .iter()
                    .map(|&metric| {
                        let value = latest
                            .get(&(machine, metric))
                            .copied()
                            .unwrap_or(MISSING_METRIC_VALUE);
                        (metric, value)
                    })
                    .collect(),
            })
            .collect())
    }

    /// Counts, extent and eviction history
    pub fn storage_stats(&self) -> StoreResult<StorageStats> {
        let inner = self.lock()?;

        let mut machines = BTreeSet::new();
        let mut metric_types = BTreeSet::new();
        for sample in inner.samples.values() {
            machines.insert(sample.machine_id.as_str());
            metric_types.insert(sample.metric);
        }

        Ok(StorageStats {
            total_samples: inner.samples.len(),
            oldest: inner.samples.keys().next().map(|(ts, _)| *ts),
            newest: inner.samples.keys().next_back().map(|(ts, _)| *ts),
            machine_count: machines.len(),
            metric_types,
            sweeps: inner.sweeps,
            evicted_total: inner.evicted_total,
        })
    }

    /// Number of stored samples
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.samples.len())
    }

    /// True when no samples are stored
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.lock()?.samples.is_empty())
    }
}
