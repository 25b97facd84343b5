//! Sample and metric types
//!
//! A `Sample` is one timestamped measurement for a machine/metric pair. Once a
//! sample has been handed to the store it is never modified; queries return
//! clones.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};
use crate::time::Timestamp;

/// Machine metric enumeration
///
/// The set is fixed; producers with other signals map them before ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MetricType {
    /// Injection shots per hour
    FireRate,
    /// Actual vs. nominal output (%)
    Efficiency,
    /// Parts per hour
    ProductionRate,
    /// Unplanned stop time
    Downtime,
    /// Overall equipment effectiveness (%)
    Oee,
    /// Share of good parts (%)
    QualityScore,
}

impl MetricType {
    /// Every metric type, in declaration order
    pub const ALL: [MetricType; 6] = [
        MetricType::FireRate,
        MetricType::Efficiency,
        MetricType::ProductionRate,
        MetricType::Downtime,
        MetricType::Oee,
        MetricType::QualityScore,
    ];

    /// Wire name (`fire_rate`, `oee`, ...)
    pub const fn name(&self) -> &'static str {
        match self {
            MetricType::FireRate => "fire_rate",
            MetricType::Efficiency => "efficiency",
            MetricType::ProductionRate => "production_rate",
            MetricType::Downtime => "downtime",
            MetricType::Oee => "oee",
            MetricType::QualityScore => "quality_score",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricType::ALL
            .iter()
            .copied()
            .find(|metric| metric.name() == s)
            .ok_or(StoreError::validation("metric", "unknown metric type"))
    }
}

/// One timestamped measurement
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Measured value
    pub value: f64,
    /// Producing machine (e.g. `INJ-001`)
    pub machine_id: String,
    /// What was measured
    pub metric: MetricType,
    /// Display unit, carried for presentation only
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub unit: Option<String>,
    /// Opaque producer metadata (display name, line, shift...)
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub metadata: BTreeMap<String, String>,
}

impl Sample {
    /// Create a sample without unit or metadata
    pub fn new(
        machine_id: impl Into<String>,
        metric: MetricType,
        value: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            timestamp,
            value,
            machine_id: machine_id.into(),
            metric,
            unit: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a display unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Attach one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check the strict ingestion contract
    ///
    /// Rejects non-finite values and blank machine ids. Unit and metadata are
    /// never inspected.
    pub fn validate(&self) -> StoreResult<()> {
        if !self.value.is_finite() {
            return Err(StoreError::validation("value", "must be a finite number"));
        }
        if self.machine_id.trim().is_empty() {
            return Err(StoreError::validation("machine_id", "must not be empty"));
        }
        Ok(())
    }
}
