//! End-to-end: producer messages through the bridge, reports out of the store

use std::sync::Arc;

use floorsight_connectors::export::{buckets_to_csv, samples_to_csv};
use floorsight_connectors::telemetry::TelemetryBridge;
use floorsight_connectors::ConnectorError;
use floorsight_core::{
    CalendarZone, Granularity, ManualClock, MetricType, QueryFilter, StoreConfig, TimeSeriesStore,
    Timestamp,
};

/// 2024-03-04T00:00:00Z
const T0: Timestamp = 1_709_510_400_000;
const MINUTE: u64 = 60_000;

fn bridge_at(now: Timestamp) -> (Arc<ManualClock>, TelemetryBridge) {
    let clock = Arc::new(ManualClock::new(now));
    let config = StoreConfig::default().with_zone(CalendarZone::Utc);
    let store = TimeSeriesStore::new(config, clock.clone()).unwrap();
    (clock, TelemetryBridge::new(Arc::new(store)))
}

#[test]
fn test_bridge_records_and_counts() {
    let (clock, mut bridge) = bridge_at(T0);

    for i in 0..10u64 {
        clock.set(T0 + i * MINUTE);
        let payload = format!(r#"{{"value": {}, "unit": "%"}}"#, 80 + i);
        bridge.handle("plant/INJ-001/oee", payload.as_bytes()).unwrap();
    }

    assert!(matches!(
        bridge.handle("plant/INJ-001/temperature", br#"{"value": 1}"#),
        Err(ConnectorError::UnknownMetric(_))
    ));
    assert!(bridge.handle("plant/INJ-001/oee", b"{").is_err());

    let stats = bridge.stats();
    assert_eq!(stats.accepted, 10);
    assert_eq!(stats.rejected, 2);
    assert!(stats.last_error.is_some());

    let store = bridge.store();
    assert_eq!(store.len().unwrap(), 10);

    let latest = store.latest("INJ-001", MetricType::Oee).unwrap().unwrap();
    assert_eq!(latest.value, 89.0);
    assert_eq!(latest.timestamp, T0 + 9 * MINUTE);
    assert_eq!(latest.unit.as_deref(), Some("%"));
}

#[test]
fn test_bridge_to_hourly_report() {
    let (_clock, mut bridge) = bridge_at(T0 + 2 * 60 * MINUTE);

    for (offset, value) in [(0u64, 100.0), (30, 110.0), (60, 90.0), (90, 70.0)] {
        let payload = format!(r#"{{"value": {value}, "timestamp": {}}}"#, T0 + offset * MINUTE);
        bridge.handle("line-a/INJ-002/fire_rate", payload.as_bytes()).unwrap();
    }

    let store = bridge.store();
    let filter = QueryFilter::range(T0, T0 + 2 * 60 * MINUTE).machines(["INJ-002"]);

    let raw_csv = samples_to_csv(&store.query(&filter).unwrap());
    assert_eq!(raw_csv.lines().count(), 5);

    let buckets = store.aggregate(&filter, Granularity::Hourly).unwrap();
    let csv = buckets_to_csv(&buckets);
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(
        rows,
        vec![
            "1709510400000,2024-03-04T00:00:00.000Z,INJ-002,fire_rate,105,100,110,210,2",
            "1709514000000,2024-03-04T01:00:00.000Z,INJ-002,fire_rate,80,70,90,160,2",
        ]
    );
}
