//! Report rendering for query and rollup results
//!
//! CSV output carries both the raw millisecond timestamp and an RFC 3339 UTC
//! rendering so spreadsheets and scripts can each pick the column they like.
//! JSON output is the serde form of the core types, pretty-printed.

use chrono::{DateTime, SecondsFormat};
use floorsight_core::{AggregatedBucket, Sample, Timestamp};

use crate::ConnectorResult;

const SAMPLE_HEADER: &str = "timestamp,time_utc,machine_id,metric,value,unit";
const BUCKET_HEADER: &str = "timestamp,time_utc,machine_id,metric,avg,min,max,sum,count";

/// Render a timestamp as RFC 3339 in UTC, or empty if out of chrono's range
fn utc_string(timestamp: Timestamp) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Quote a CSV field when it contains a delimiter, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// One row per sample, in input order
pub fn samples_to_csv(samples: &[Sample]) -> String {
    let mut out = String::with_capacity(64 * (samples.len() + 1));
    out.push_str(SAMPLE_HEADER);
    out.push('\n');
    for s in samples {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            s.timestamp,
            utc_string(s.timestamp),
            escape(&s.machine_id),
            s.metric,
            s.value,
            escape(s.unit.as_deref().unwrap_or("")),
        ));
    }
    out
}

/// One row per bucket, in input order
pub fn buckets_to_csv(buckets: &[AggregatedBucket]) -> String {
    let mut out = String::with_capacity(96 * (buckets.len() + 1));
    out.push_str(BUCKET_HEADER);
    out.push('\n');
    for b in buckets {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            b.timestamp,
            utc_string(b.timestamp),
            escape(&b.machine_id),
            b.metric,
            b.avg,
            b.min,
            b.max,
            b.sum,
            b.count,
        ));
    }
    out
}

pub fn samples_to_json(samples: &[Sample]) -> ConnectorResult<String> {
    Ok(serde_json::to_string_pretty(samples)?)
}

pub fn buckets_to_json(buckets: &[AggregatedBucket]) -> ConnectorResult<String> {
    Ok(serde_json::to_string_pretty(buckets)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorsight_core::MetricType;
    use proptest::prelude::*;

    const T0: Timestamp = 1_709_510_400_000;

    fn bucket() -> AggregatedBucket {
        AggregatedBucket {
            timestamp: T0,
            machine_id: "INJ-001".into(),
            metric: MetricType::Oee,
            avg: 80.0,
            min: 70.0,
            max: 90.0,
            sum: 240.0,
            count: 3,
        }
    }

    #[test]
    fn test_utc_string() {
        assert_eq!(utc_string(T0), "2024-03-04T00:00:00.000Z");
        assert_eq!(utc_string(T0 + 1_500), "2024-03-04T00:00:01.500Z");
        assert_eq!(utc_string(u64::MAX), "");
    }

    #[test]
    fn test_samples_csv() {
        let samples = vec![
            Sample::new("INJ-001", MetricType::FireRate, 118.5, T0).with_unit("shots/h"),
            Sample::new("Press, Hall \"B\"", MetricType::Downtime, 3.0, T0 + 60_000),
        ];
        let csv = samples_to_csv(&samples);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SAMPLE_HEADER);
        assert_eq!(lines[1], "1709510400000,2024-03-04T00:00:00.000Z,INJ-001,fire_rate,118.5,shots/h");
        assert_eq!(
            lines[2],
            "1709510460000,2024-03-04T00:01:00.000Z,\"Press, Hall \"\"B\"\"\",downtime,3,"
        );
    }

    #[test]
    fn test_buckets_csv() {
        let csv = buckets_to_csv(&[bucket()]);
        assert_eq!(
            csv,
            format!("{BUCKET_HEADER}\n1709510400000,2024-03-04T00:00:00.000Z,INJ-001,oee,80,70,90,240,3\n")
        );
        assert_eq!(buckets_to_csv(&[]), format!("{BUCKET_HEADER}\n"));
    }

    #[test]
    fn test_json_export() {
        let json = buckets_to_json(&[bucket()]).unwrap();
        let parsed: Vec<AggregatedBucket> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![bucket()]);
        assert!(json.contains("\"metric\": \"oee\""));

        let sample = Sample::new("INJ-002", MetricType::QualityScore, 99.1, T0).with_metadata("line", "A");
        let json = samples_to_json(std::slice::from_ref(&sample)).unwrap();
        assert!(json.contains("\"quality_score\""));
        assert!(!json.contains("\"unit\""));
        let parsed: Vec<Sample> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![sample]);
    }

    proptest! {
        #[test]
        fn escaped_fields_never_split_rows(id in "[a-zA-Z0-9,\" -]{1,20}") {
            let csv = samples_to_csv(&[Sample::new(id.clone(), MetricType::Oee, 1.0, T0)]);
            let row = csv.lines().nth(1).unwrap();
            let field = row.splitn(3, ',').nth(2).unwrap();
            let expected = escape(&id);
            prop_assert!(field.starts_with(&expected));
            prop_assert_eq!(&field[expected.len()..], ",oee,1,");
        }
    }
}
