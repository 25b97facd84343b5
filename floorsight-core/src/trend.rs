//! Trend classification between the oldest and newest sample of a window

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::STABLE_BAND_PERCENT;

/// Direction of change over a lookback window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Trend {
    /// Rose by more than the stable band
    Increasing,
    /// Fell by more than the stable band
    Decreasing,
    /// Within the band, or not enough data
    Stable,
}

impl Trend {
    /// Classify a percentage change against the ±5% stable band
    pub fn classify(change_percent: f64) -> Self {
        if !change_percent.is_finite() || change_percent.abs() <= STABLE_BAND_PERCENT {
            Trend::Stable
        } else if change_percent > 0.0 {
            Trend::Increasing
        } else {
            Trend::Decreasing
        }
    }
}

/// Outcome of `TimeSeriesStore::trend_analysis`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrendResult {
    /// Classification of `change_percent`
    pub trend: Trend,
    /// `(current - previous) / previous × 100`
    pub change_percent: f64,
    /// Value of the newest sample in the window
    pub current_value: f64,
    /// Value of the oldest sample in the window
    pub previous_value: f64,
}

impl TrendResult {
    /// No samples in the window
    pub const fn empty() -> Self {
        Self::flat(0.0)
    }

    /// Exactly one sample in the window
    pub const fn single(value: f64) -> Self {
        Self::flat(value)
    }

    const fn flat(value: f64) -> Self {
        Self {
            trend: Trend::Stable,
            change_percent: 0.0,
            current_value: value,
            previous_value: value,
        }
    }

    /// Change from `previous` to `current`
    ///
    /// A zero baseline has no defined percentage; it reports 0% / stable.
    pub fn between(previous: f64, current: f64) -> Self {
        if previous == 0.0 {
            return Self {
                trend: Trend::Stable,
                change_percent: 0.0,
                current_value: current,
                previous_value: previous,
            };
        }

        let change_percent = (current - previous) / previous * 100.0;
        Self {
            trend: Trend::classify(change_percent),
            change_percent,
            current_value: current,
            previous_value: previous,
        }
    }
}
