//! Producer message decoding
//!
//! Topics follow `<prefix...>/<machine_id>/<metric>`; only the last two
//! segments are interpreted, so `plant/hall-2/INJ-001/oee` and
//! `telemetry/INJ-001/oee` both route to machine `INJ-001`.
//!
//! Bodies are JSON objects:
//!
//! ```json
//! { "value": 87.5, "timestamp": 1709510400000, "unit": "%", "metadata": { "line": "A" } }
//! ```
//!
//! `value` may be a number or a numeric string. A missing `timestamp` is
//! replaced by the receive time. Non-string metadata values are stored in
//! their JSON text form.

use std::collections::BTreeMap;
use std::sync::Arc;

use floorsight_core::{MetricType, Sample, TimeSeriesStore, Timestamp};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::{ConnectorError, ConnectorResult};

/// Machine and metric addressed by a topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRoute {
    pub machine_id: String,
    pub metric: MetricType,
}

/// Split a topic into its machine and metric
pub fn parse_topic(topic: &str) -> ConnectorResult<TopicRoute> {
    let segments: Vec<&str> = topic.split('/').collect();
    if segments.len() < 3 {
        return Err(ConnectorError::Topic(format!(
            "expected <prefix>/<machine>/<metric>, got '{topic}'"
        )));
    }

    let machine_id = segments[segments.len() - 2].trim();
    let metric_name = segments[segments.len() - 1].trim();
    if machine_id.is_empty() {
        return Err(ConnectorError::Topic(format!("empty machine segment in '{topic}'")));
    }

    let metric = metric_name
        .parse::<MetricType>()
        .map_err(|_| ConnectorError::UnknownMetric(metric_name.to_string()))?;

    Ok(TopicRoute { machine_id: machine_id.to_string(), metric })
}

#[derive(Debug, Deserialize)]
struct RawReading {
    value: Value,
    #[serde(default)]
    timestamp: Option<Timestamp>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

fn numeric_value(value: &Value) -> ConnectorResult<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(ConnectorError::Payload("value must be finite".into())),
        None => Err(ConnectorError::Payload(format!("value is not numeric: {value}"))),
    }
}

/// Decode one producer message into a sample
///
/// `received_at` stamps readings that carry no timestamp of their own.
pub fn decode_payload(topic: &str, payload: &[u8], received_at: Timestamp) -> ConnectorResult<Sample> {
    let route = parse_topic(topic)?;
    let raw: RawReading = serde_json::from_slice(payload)?;
    let value = numeric_value(&raw.value)?;

    let mut sample = Sample::new(route.machine_id, route.metric, value, raw.timestamp.unwrap_or(received_at));
    sample.unit = raw.unit;
    sample.metadata = raw
        .metadata
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect();

    Ok(sample)
}

/// Counters for a [`TelemetryBridge`]
#[derive(Debug, Default, Clone)]
pub struct BridgeStats {
    /// Messages recorded into the store
    pub accepted: u64,
    /// Messages dropped by decoding or validation
    pub rejected: u64,
    /// Last error message
    pub last_error: Option<String>,
}

/// Feeds decoded producer messages into a shared store
#[derive(Debug)]
pub struct TelemetryBridge {
    store: Arc<TimeSeriesStore>,
    stats: BridgeStats,
}

impl TelemetryBridge {
    pub fn new(store: Arc<TimeSeriesStore>) -> Self {
        Self { store, stats: BridgeStats::default() }
    }

    /// Decode and record one message
    ///
    /// Failures are counted and returned; the bridge stays usable.
    pub fn handle(&mut self, topic: &str, payload: &[u8]) -> ConnectorResult<()> {
        let result = decode_payload(topic, payload, self.store.now())
            .and_then(|sample| self.store.record(sample).map_err(ConnectorError::from));

        match &result {
            Ok(()) => {
                self.stats.accepted += 1;
                debug!("Recorded reading from {topic}");
            }
            Err(e) => {
                self.stats.rejected += 1;
                self.stats.last_error = Some(e.to_string());
                warn!("Dropped reading from {topic}: {e}");
            }
        }
        result
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    pub fn store(&self) -> &Arc<TimeSeriesStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = 1_709_510_400_000;

    #[test]
    fn test_parse_topic_uses_last_two_segments() {
        let route = parse_topic("plant/hall-2/INJ-001/oee").unwrap();
        assert_eq!(route.machine_id, "INJ-001");
        assert_eq!(route.metric, MetricType::Oee);

        let route = parse_topic("telemetry/PRS-004/fire_rate").unwrap();
        assert_eq!(route.machine_id, "PRS-004");
        assert_eq!(route.metric, MetricType::FireRate);
    }

    #[test]
    fn test_parse_topic_rejects_malformed() {
        assert!(matches!(parse_topic("INJ-001/oee"), Err(ConnectorError::Topic(_))));
        assert!(matches!(parse_topic("plant//oee"), Err(ConnectorError::Topic(_))));
        assert!(matches!(
            parse_topic("plant/INJ-001/temperature"),
            Err(ConnectorError::UnknownMetric(name)) if name == "temperature"
        ));
    }

    #[test]
    fn test_decode_full_payload() {
        let payload = br#"{"value": 87.5, "timestamp": 1709500000000, "unit": "%",
                           "metadata": {"line": "A", "shift": 2}}"#;
        let sample = decode_payload("plant/INJ-001/efficiency", payload, NOW).unwrap();

        assert_eq!(sample.machine_id, "INJ-001");
        assert_eq!(sample.metric, MetricType::Efficiency);
        assert_eq!(sample.value, 87.5);
        assert_eq!(sample.timestamp, 1_709_500_000_000);
        assert_eq!(sample.unit.as_deref(), Some("%"));
        assert_eq!(sample.metadata["line"], "A");
        assert_eq!(sample.metadata["shift"], "2");
    }

    #[test]
    fn test_decode_defaults_timestamp_and_accepts_numeric_strings() {
        let sample = decode_payload("plant/INJ-001/downtime", br#"{"value": " 12.25 "}"#, NOW).unwrap();
        assert_eq!(sample.value, 12.25);
        assert_eq!(sample.timestamp, NOW);
        assert!(sample.unit.is_none());
        assert!(sample.metadata.is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_values() {
        let topic = "plant/INJ-001/oee";
        assert!(matches!(
            decode_payload(topic, br#"{"value": "fast"}"#, NOW),
            Err(ConnectorError::Payload(_))
        ));
        assert!(matches!(
            decode_payload(topic, br#"{"value": null}"#, NOW),
            Err(ConnectorError::Payload(_))
        ));
        assert!(matches!(
            decode_payload(topic, br#"{"value": "inf"}"#, NOW),
            Err(ConnectorError::Payload(_))
        ));
        assert!(matches!(
            decode_payload(topic, br#"{"unit": "%"}"#, NOW),
            Err(ConnectorError::Serialization(_))
        ));
        assert!(matches!(
            decode_payload(topic, b"not json", NOW),
            Err(ConnectorError::Serialization(_))
        ));
    }
}
