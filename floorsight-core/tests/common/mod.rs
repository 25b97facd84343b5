//! Common test utilities for store integration tests
//!
//! This module provides:
//! - A fixed reference instant and a manual clock pinned to it
//! - Store constructors with a UTC calendar so bucket floors are host-independent
//! - Producer-style sample generators

#![allow(dead_code)]

use std::sync::Arc;

use floorsight_core::{
    CalendarZone, ManualClock, MetricType, Sample, StoreConfig, TimeSeriesStore, Timestamp,
};

/// 2024-03-04T00:00:00Z (a Monday)
pub const T0: Timestamp = 1_709_510_400_000;

pub const MINUTE: u64 = 60_000;
pub const HOUR: u64 = 60 * MINUTE;
pub const DAY: u64 = 24 * HOUR;

/// Store plus the clock driving it
pub struct Fixture {
    pub clock: Arc<ManualClock>,
    pub store: TimeSeriesStore,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::at(T0, config)
    }

    pub fn at(now: Timestamp, config: StoreConfig) -> Self {
        let clock = Arc::new(ManualClock::new(now));
        let store = TimeSeriesStore::new(config.with_zone(CalendarZone::Utc), clock.clone())
            .expect("fixture config must be valid");
        Self { clock, store }
    }

    pub fn record(&self, machine: &str, metric: MetricType, value: f64, timestamp: Timestamp) {
        self.store
            .record(Sample::new(machine, metric, value, timestamp))
            .expect("fixture sample must be valid");
    }
}

/// Deterministic xorshift generator so tests don't need a `rand` dependency
pub struct TestRng(u64);

impl TestRng {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[lo, hi)`
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    }
}

/// A producer emitting one sample per metric every `interval` ms
pub fn machine_feed(
    machine: &str,
    start: Timestamp,
    interval: u64,
    readings: usize,
    rng: &mut TestRng,
) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(readings * MetricType::ALL.len());
    for i in 0..readings {
        let timestamp = start + i as u64 * interval;
        for metric in MetricType::ALL {
            let value = match metric {
                MetricType::FireRate => rng.range_f64(100.0, 140.0),
                MetricType::ProductionRate => rng.range_f64(400.0, 600.0),
                MetricType::Downtime => rng.range_f64(0.0, 15.0),
                _ => rng.range_f64(60.0, 100.0),
            };
            samples.push(Sample::new(machine, metric, value, timestamp).with_unit("%"));
        }
    }
    samples
}
