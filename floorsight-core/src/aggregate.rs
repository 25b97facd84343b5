//! Bucketed aggregation
//!
//! One pass over the matching samples: each sample is keyed by
//! `(floor(timestamp), machine_id, metric)` and folded into a running
//! `{sum, count, min, max}`. Buckets are emitted ascending by floor, then
//! machine id, then metric, so identical input always yields identical
//! output.
//!
//! Emitted buckets satisfy `count >= 1` and `min <= avg <= max`.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarZone, Granularity};
use crate::sample::{MetricType, Sample};
use crate::time::Timestamp;

/// Statistics for one (period, machine, metric) group
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AggregatedBucket {
    /// Period start (bucket floor)
    pub timestamp: Timestamp,
    /// Machine the bucket belongs to
    pub machine_id: String,
    /// Metric the bucket belongs to
    pub metric: MetricType,
    /// Mean of the bucket's values
    pub avg: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Sum of the values
    pub sum: f64,
    /// Number of samples folded into this bucket
    pub count: usize,
}

impl AggregatedBucket {
    /// Single-sample bucket used for `Granularity::Raw`
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp,
            machine_id: sample.machine_id.clone(),
            metric: sample.metric,
            avg: sample.value,
            min: sample.value,
            max: sample.value,
            sum: sample.value,
            count: 1,
        }
    }
}

/// Running statistics for one bucket
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new(value: f64) -> Self {
        Self {
            sum: value,
            count: 1,
            min: value,
            max: value,
        }
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Mean, pinned into `[min, max]` against rounding drift
    fn avg(&self) -> f64 {
        let avg = self.sum / self.count as f64;
        if avg < self.min {
            self.min
        } else if avg > self.max {
            self.max
        } else {
            avg
        }
    }
}

/// Aggregate `samples` at `granularity`
///
/// `samples` must already be filtered. `Raw` emits one bucket per sample in
/// input order.
pub fn aggregate_samples<'a, I>(
    samples: I,
    granularity: Granularity,
    zone: CalendarZone,
) -> Vec<AggregatedBucket>
where
    I: IntoIterator<Item = &'a Sample>,
{
    if granularity == Granularity::Raw {
        return samples.into_iter().map(AggregatedBucket::from_sample).collect();
    }

    let mut buckets: BTreeMap<(Timestamp, &'a str, MetricType), Accumulator> = BTreeMap::new();

    for sample in samples {
        let key = (
            granularity.floor(sample.timestamp, zone),
            sample.machine_id.as_str(),
            sample.metric,
        );
        buckets
            .entry(key)
            .and_modify(|acc| acc.add(sample.value))
            .or_insert_with(|| Accumulator::new(sample.value));
    }

    buckets
        .into_iter()
        .map(|((timestamp, machine_id, metric), acc)| AggregatedBucket {
            timestamp,
            machine_id: machine_id.to_string(),
            metric,
            avg: acc.avg(),
            min: acc.min,
            max: acc.max,
            sum: acc.sum,
            count: acc.count,
        })
        .collect()
}
