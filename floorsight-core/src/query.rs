//! Range query filters
//!
//! The store answers one query shape: machine set × metric set × inclusive
//! time range. An omitted set matches everything.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};
use crate::sample::{MetricType, Sample};
use crate::time::Timestamp;

/// Selection of samples by machine, metric and `[start, end]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueryFilter {
    /// Machines to include; `None` means all
    #[cfg_attr(feature = "serde", serde(default))]
    pub machine_ids: Option<BTreeSet<String>>,
    /// Metrics to include; `None` means all
    #[cfg_attr(feature = "serde", serde(default))]
    pub metric_types: Option<BTreeSet<MetricType>>,
    /// Inclusive window start (ms)
    pub start: Timestamp,
    /// Inclusive window end (ms)
    pub end: Timestamp,
}

impl QueryFilter {
    /// Every sample in `[start, end]`
    pub fn range(start: Timestamp, end: Timestamp) -> Self {
        Self {
            machine_ids: None,
            metric_types: None,
            start,
            end,
        }
    }

    /// Restrict to the given machines
    pub fn machines<I, S>(mut self, machines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.machine_ids = Some(machines.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to the given metrics
    pub fn metrics<I>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = MetricType>,
    {
        self.metric_types = Some(metrics.into_iter().collect());
        self
    }

    /// Reject inverted windows
    pub fn check(&self) -> StoreResult<()> {
        if self.start > self.end {
            return Err(StoreError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Machine/metric match; the time range is applied by the store's index
    pub fn matches_series(&self, sample: &Sample) -> bool {
        let machine_ok = self
            .machine_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&sample.machine_id));
        let metric_ok = self
            .metric_types
            .as_ref()
            .map_or(true, |metrics| metrics.contains(&sample.metric));
        machine_ok && metric_ok
    }

    /// Full match including the time range
    pub fn matches(&self, sample: &Sample) -> bool {
        self.start <= sample.timestamp && sample.timestamp <= self.end && self.matches_series(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_filter_matches_everything_in_range() {
        let filter = QueryFilter::range(100, 200);
        assert!(filter.matches(&Sample::new("A", MetricType::Oee, 1.0, 100)));
        assert!(filter.matches(&Sample::new("B", MetricType::Downtime, 1.0, 200)));
        assert!(!filter.matches(&Sample::new("A", MetricType::Oee, 1.0, 201)));
        assert!(!filter.matches(&Sample::new("A", MetricType::Oee, 1.0, 99)));
    }

    #[test]
    fn sets_restrict_series() {
        let filter = QueryFilter::range(0, 10)
            .machines(["INJ-001"])
            .metrics([MetricType::FireRate, MetricType::Oee]);

        assert!(filter.matches(&Sample::new("INJ-001", MetricType::Oee, 1.0, 5)));
        assert!(!filter.matches(&Sample::new("INJ-002", MetricType::Oee, 1.0, 5)));
        assert!(!filter.matches(&Sample::new("INJ-001", MetricType::Efficiency, 1.0, 5)));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let filter = QueryFilter::range(0, 10).machines(Vec::<String>::new());
        assert!(!filter.matches(&Sample::new("INJ-001", MetricType::Oee, 1.0, 5)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            QueryFilter::range(10, 5).check(),
            Err(StoreError::InvalidRange { start: 10, end: 5 })
        );
        assert!(QueryFilter::range(5, 5).check().is_ok());
    }
}
