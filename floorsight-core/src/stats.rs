//! Read-only summaries returned to dashboards

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sample::MetricType;
use crate::time::Timestamp;

/// Storage diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StorageStats {
    /// Samples currently held
    pub total_samples: usize,
    /// Oldest stored timestamp, `None` when empty
    pub oldest: Option<Timestamp>,
    /// Newest stored timestamp, `None` when empty
    pub newest: Option<Timestamp>,
    /// Distinct machine ids
    pub machine_count: usize,
    /// Distinct metric types present
    pub metric_types: BTreeSet<MetricType>,
    /// Retention sweeps that evicted at least one sample
    pub sweeps: u64,
    /// Samples evicted since construction
    pub evicted_total: u64,
}

/// Latest value of every metric for one machine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineSnapshot {
    /// Machine the values belong to
    pub machine_id: String,
    /// One entry per `MetricType`; metrics without samples read 0
    pub metrics: BTreeMap<MetricType, f64>,
}

impl MachineSnapshot {
    /// Latest value for `metric`
    pub fn value(&self, metric: MetricType) -> f64 {
        self.metrics
            .get(&metric)
            .copied()
            .unwrap_or(crate::constants::MISSING_METRIC_VALUE)
    }
}
