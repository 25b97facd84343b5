//! Boundary Adapters for the FloorSight Store
//!
//! ## Overview
//!
//! The store only accepts typed [`Sample`]s and only returns typed results.
//! Everything dynamically typed lives here, at the edge:
//!
//! - [`telemetry`]: producer messages (`<prefix>/<machine>/<metric>` topics
//!   with JSON bodies, as published by MQTT brokers, PLC pollers and edge
//!   gateways) are parsed, validated and converted into samples
//! - [`export`]: query and rollup results are rendered as CSV or JSON
//!   documents for report generators
//!
//! ## Validation at the Boundary
//!
//! Producers send whatever their firmware emits: numbers as strings, missing
//! timestamps, metric names the plant invented last week. The telemetry
//! decoder rejects what cannot be represented (unknown metric, non-numeric or
//! non-finite value, malformed topic) with a [`ConnectorError`] naming the
//! problem, so garbage never reaches the store.
//!
//! ```text
//! broker ──topic+JSON──▶ decode_payload ──Sample──▶ TimeSeriesStore
//!                             │
//!                             └── ConnectorError (counted, logged, dropped)
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use floorsight_core::{StoreConfig, TimeSeriesStore};
//! use floorsight_connectors::telemetry::TelemetryBridge;
//!
//! let store = Arc::new(TimeSeriesStore::with_system_clock(StoreConfig::default())?);
//! let mut bridge = TelemetryBridge::new(Arc::clone(&store));
//!
//! bridge.handle("plant/INJ-001/fire_rate", br#"{"value": 118.5, "unit": "shots/h"}"#)?;
//! assert_eq!(bridge.stats().accepted, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod export;
pub mod telemetry;

use floorsight_core::StoreError;
use thiserror::Error;

pub use floorsight_core::Sample;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Malformed topic: {0}")]
    Topic(String),

    #[error("Unknown metric type: {0}")]
    UnknownMetric(String),

    #[error("Invalid payload: {0}")]
    Payload(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store rejected sample: {0}")]
    Store(#[from] StoreError),
}

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;
