//! InfluxDB line protocol encoding.

use crate::model::{FieldValue, Metric};
use crate::util::error::MapperError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Timestamp precision of written points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "n")]
    Nanoseconds,
    #[serde(rename = "u")]
    Microseconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[default]
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
}

impl Precision {
    /// Value of the `precision` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "n",
            Precision::Microseconds => "u",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
            Precision::Minutes => "m",
            Precision::Hours => "h",
        }
    }

    pub fn timestamp(&self, time: DateTime<Utc>) -> Option<i64> {
        match self {
            Precision::Nanoseconds => time.timestamp_nanos_opt(),
            Precision::Microseconds => Some(time.timestamp_micros()),
            Precision::Milliseconds => Some(time.timestamp_millis()),
            Precision::Seconds => Some(time.timestamp()),
            Precision::Minutes => Some(time.timestamp().div_euclid(60)),
            Precision::Hours => Some(time.timestamp().div_euclid(3600)),
        }
    }
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_measurement(s: &str) -> String {
    escape(s, &[',', ' '])
}

fn escape_key(s: &str) -> String {
    escape(s, &[',', '=', ' '])
}

fn encode_field(value: &FieldValue) -> Result<String, MapperError> {
    Ok(match value {
        FieldValue::Integer(i) => format!("{i}i"),
        FieldValue::Float(f) if f.is_finite() => format!("{f}"),
        FieldValue::Float(f) => {
            return Err(MapperError::Query(format!("cannot store float {f}")));
        }
        FieldValue::Boolean(b) => b.to_string(),
        FieldValue::Text(s) => format!("\"{}\"", escape(s, &['\\', '"'])),
    })
}

/// Encodes one point. Points need a name and at least one field; tags with
/// an empty value are left out.
pub fn encode(metric: &Metric, precision: Precision) -> Result<String, MapperError> {
    if metric.name().is_empty() {
        return Err(MapperError::Query("metric without a name".into()));
    }
    if metric.fields().is_empty() {
        return Err(MapperError::Query(format!(
            "metric {} has no fields",
            metric.name()
        )));
    }

    let mut line = escape_measurement(metric.name());

    for (key, value) in metric.tags().iter().filter(|(_, v)| !v.is_empty()) {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    let fields = metric
        .fields()
        .iter()
        .map(|(key, value)| Ok(format!("{}={}", escape_key(key), encode_field(value)?)))
        .collect::<Result<Vec<_>, MapperError>>()?;
    line.push(' ');
    line.push_str(&fields.join(","));

    if let Some(time) = metric.time() {
        let ts = precision.timestamp(time).ok_or_else(|| {
            MapperError::Query(format!("timestamp {time} out of range"))
        })?;
        line.push(' ');
        line.push_str(&ts.to_string());
    }

    Ok(line)
}

/// Line protocol body of a write request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub body: String,
    /// Number of points in `body`.
    pub points: usize,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.points == 0
    }
}

/// Encodes a batch, one point per line. Points that cannot be encoded are
/// logged and left out of both the body and the count.
pub fn encode_batch(metrics: &[Metric], precision: Precision) -> Batch {
    let lines: Vec<String> = metrics
        .iter()
        .filter_map(|metric| match encode(metric, precision) {
            Ok(line) => Some(line),
            Err(err) => {
                warn!(error = %err, measurement = metric.name(), "skipping point");
                None
            }
        })
        .collect();

    Batch {
        points: lines.len(),
        body: lines.join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn metric(time: Option<DateTime<Utc>>) -> Metric {
        let mut m = Metric::new("coverage", BTreeMap::new(), BTreeMap::new(), time);
        m.add_tag("latitude", "50.8609");
        m.add_tag("data_rate", "SF7BW125");
        m.add_field("size", 7i64);
        m.add_field("rssi", 0i64);
        m.add_field("snr", 0.0);
        m
    }

    #[test]
    fn test_encode_sorted_tags_and_typed_fields() -> Result<(), MapperError> {
        assert_eq!(
            encode(&metric(None), Precision::Seconds)?,
            "coverage,data_rate=SF7BW125,latitude=50.8609 rssi=0i,size=7i,snr=0"
        );
        Ok(())
    }

    #[test]
    fn test_encode_timestamp_precision() -> Result<(), MapperError> {
        let time = DateTime::parse_from_rfc3339("2018-04-01T12:06:00Z")
            .map_err(|e| MapperError::Query(e.to_string()))?
            .with_timezone(&Utc);

        let line = encode(&metric(Some(time)), Precision::Seconds)?;
        assert!(line.ends_with(" 1522584360"));

        let line = encode(&metric(Some(time)), Precision::Milliseconds)?;
        assert!(line.ends_with(" 1522584360000"));

        let line = encode(&metric(Some(time)), Precision::Hours)?;
        assert!(line.ends_with(" 422940"));
        Ok(())
    }

    #[test]
    fn test_escaping() -> Result<(), MapperError> {
        let mut m = Metric::new("cov erage,x", BTreeMap::new(), BTreeMap::new(), None);
        m.add_tag("device id", "a=b,c");
        m.add_tag("empty", "");
        m.add_field("note", "say \"hi\" \\o/");
        m.add_field("ok", true);

        assert_eq!(
            encode(&m, Precision::Seconds)?,
            r#"cov\ erage\,x,device\ id=a\=b\,c note="say \"hi\" \\o/",ok=true"#
        );
        Ok(())
    }

    #[test]
    fn test_encode_rejects_pointless_metrics() {
        let m = Metric::new("coverage", BTreeMap::new(), BTreeMap::new(), None);
        assert!(encode(&m, Precision::Seconds).is_err());

        let mut m = Metric::new("coverage", BTreeMap::new(), BTreeMap::new(), None);
        m.add_field("snr", f64::NAN);
        assert!(encode(&m, Precision::Seconds).is_err());
    }

    #[test]
    fn test_encode_batch_skips_invalid() {
        let empty = Metric::new("coverage", BTreeMap::new(), BTreeMap::new(), None);
        let batch = encode_batch(&[metric(None), empty, metric(None)], Precision::Seconds);
        assert_eq!(batch.points, 2);
        assert_eq!(batch.body.lines().count(), 2);
    }

    #[test]
    fn test_encode_batch_all_invalid_is_empty() {
        let mut nan = Metric::new("coverage", BTreeMap::new(), BTreeMap::new(), None);
        nan.add_field("snr", f64::NAN);
        let batch = encode_batch(&[nan], Precision::Seconds);
        assert!(batch.is_empty());
        assert_eq!(batch.body, "");
    }

    #[test]
    fn test_precision_serde_names() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Precision::Milliseconds)?, "\"ms\"");
        let p: Precision = serde_json::from_str("\"n\"")?;
        assert_eq!(p, Precision::Nanoseconds);
        assert_eq!(Precision::default().as_str(), "s");
        Ok(())
    }
}
