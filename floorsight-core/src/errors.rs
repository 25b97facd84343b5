//! Error Types for the Time-Series Store
//!
//! ## Design Philosophy
//!
//! Store errors follow the same rules as every other hot-path type in the crate:
//!
//! 1. **Small Size**: variants carry a handful of scalars, so returning an error
//!    from `record` costs no more than returning the sample count.
//!
//! 2. **No Heap Allocation**: context is `&'static str` only. Producers that need
//!    the offending payload already hold it.
//!
//! 3. **Copy Semantics**: errors are `Copy` so they can be logged, counted and
//!    returned without cloning.
//!
//! ## Error Categories
//!
//! ### Input Errors
//! - `Validation`: a sample failed the strict ingestion contract (non-finite
//!   value, empty machine id, unknown metric name)
//! - `InvalidRange`: a query window with `start > end`
//!
//! ### Setup Errors
//! - `Config`: a `StoreConfig` that cannot bound memory (zero retention, zero
//!   capacity, threshold outside `(0, 1]`)
//!
//! ### System Issues
//! - `LockPoisoned`: a thread panicked while holding the store lock
//!
//! Empty results are never errors: a query against an empty store returns an
//! empty `Vec`, and a trend over an empty window is the `stable`/zero result.
//!
//! ```rust
//! use floorsight_core::{StoreError, Sample, MetricType};
//!
//! let sample = Sample::new("INJ-001", MetricType::Oee, f64::NAN, 0);
//! match sample.validate() {
//!     Err(StoreError::Validation { field, .. }) => assert_eq!(field, "value"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use crate::time::Timestamp;
use thiserror_no_std::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors - kept small and `Copy`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// A sample field failed validation
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field (`value`, `machine_id`, `metric`)
        field: &'static str,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Query window is inverted
    #[error("Invalid time range: start {start} is after end {end}")]
    InvalidRange {
        /// Requested window start (ms)
        start: Timestamp,
        /// Requested window end (ms)
        end: Timestamp,
    },

    /// Configuration cannot be used to build a store
    #[error("Configuration error: {0}")]
    Config(&'static str),

    /// Another thread panicked while holding the store lock
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Shorthand for a validation failure
    pub const fn validation(field: &'static str, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    /// True for errors caused by the caller's input rather than the store
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let err = StoreError::validation("machine_id", "must not be empty");
        assert_eq!(err.to_string(), "Invalid machine_id: must not be empty");
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(StoreError::InvalidRange { start: 2, end: 1 }.is_input_error());
        assert!(!StoreError::LockPoisoned.is_input_error());
        assert!(!StoreError::Config("zero capacity").is_input_error());
    }
}
