//! Import of Sodaq One logger files.
//!
//! The logger writes one semicolon separated line per scan:
//! `lat;lon;pwr;sf[;start]`, with coordinates in units of 1e-7 degrees and
//! `sf` a bitmask of the spreading factors that got an answer.

use crate::core::constants::DEFAULT_MEASUREMENT;
use crate::core::fixed_point::format_signed;
use crate::model::{DataRate, FieldValue, Metric};
use crate::store::Store;
use crate::util::error::MapperError;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Header line written by the logger.
pub const CSV_HEADER: [&str; 4] = ["lat", "lon", "pwr", "sf"];

/// Packet size the logger sends, in bytes.
pub const DEFAULT_SIZE: i64 = 7;

/// Raw logger units per fixed-point unit (1e-7 to 1e-4 degrees).
const RAW_PER_SCALED: i64 = 1_000;

/// Turns logger files into coverage metrics.
///
/// # Example
/// ```
/// use lora_mapper::SodaqParser;
///
/// let parser = SodaqParser::new("coverage").default_tag("device_id", "sodaq-1");
/// let metrics = parser.parse("lat;lon;pwr;sf\n508609281;46818589;1;3\n".as_bytes());
///
/// assert_eq!(metrics.len(), 2);
/// assert_eq!(metrics[0].tag("latitude"), Some("50.8609"));
/// assert_eq!(metrics[1].tag("data_rate"), Some("SF8BW125"));
/// ```
#[derive(Debug, Clone)]
pub struct SodaqParser {
    measurement: String,
    default_tags: BTreeMap<String, String>,
}

impl SodaqParser {
    /// An empty measurement name falls back to `coverage`.
    pub fn new(measurement: impl Into<String>) -> Self {
        let measurement = measurement.into();
        Self {
            measurement: if measurement.trim().is_empty() {
                DEFAULT_MEASUREMENT.to_string()
            } else {
                measurement
            },
            default_tags: BTreeMap::new(),
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Tag copied onto every metric, e.g. the logger's `device_id`.
    pub fn default_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_tags.insert(key.into(), value.into());
        self
    }

    pub fn default_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.default_tags = tags;
        self
    }

    /// Parses every readable record; broken ones are logged and skipped.
    pub fn parse<R: Read>(&self, reader: R) -> Vec<Metric> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut metrics = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!(line = index + 1, error = %err, "unreadable record");
                    continue;
                }
            };

            match self.metrics_from_record(&record) {
                Ok(found) => metrics.extend(found),
                Err(err) => warn!(line = index + 1, error = %err, "skipping record"),
            }
        }

        metrics
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<Metric>, MapperError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| MapperError::Io(format!("{}: {e}", path.display())))?;
        Ok(self.parse(file))
    }

    /// One metric per spreading factor in the mask, or a single metric
    /// without `data_rate` when the mask is empty.
    fn metrics_from_record(&self, record: &StringRecord) -> Result<Vec<Metric>, MapperError> {
        if is_header(record) {
            return Ok(Vec::new());
        }
        if !(4..=5).contains(&record.len()) {
            return Err(MapperError::Csv(format!(
                "expected 4 or 5 fields, found {}",
                record.len()
            )));
        }

        let latitude = parse_coordinate(&record[0])?;
        let longitude = parse_coordinate(&record[1])?;
        let mask = record[3]
            .parse::<u8>()
            .map_err(|e| MapperError::Csv(format!("sf {:?}: {e}", &record[3])))?;
        let time = match record.get(4).filter(|s| !s.is_empty()) {
            Some(start) => Some(
                DateTime::parse_from_rfc3339(start)
                    .map_err(|e| MapperError::Csv(format!("start {start:?}: {e}")))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        let mut tags = self.default_tags.clone();
        tags.insert("latitude".to_string(), latitude);
        tags.insert("longitude".to_string(), longitude);
        tags.insert("power".to_string(), record[2].to_string());

        let fields = BTreeMap::from([
            ("size".to_string(), FieldValue::Integer(DEFAULT_SIZE)),
            ("rssi".to_string(), FieldValue::Integer(0)),
            ("snr".to_string(), FieldValue::Float(0.0)),
        ]);

        let rates = DataRate::from_mask(mask);
        if rates.is_empty() {
            return Ok(vec![Metric::new(&self.measurement, tags, fields, time)]);
        }

        Ok(rates
            .into_iter()
            .map(|rate| {
                let mut metric =
                    Metric::new(&self.measurement, tags.clone(), fields.clone(), time);
                metric.add_tag("data_rate", rate.to_string());
                metric
            })
            .collect())
    }
}

impl Default for SodaqParser {
    fn default() -> Self {
        Self::new(DEFAULT_MEASUREMENT)
    }
}

fn is_header(record: &StringRecord) -> bool {
    record
        .iter()
        .zip(CSV_HEADER)
        .all(|(field, expected)| field.eq_ignore_ascii_case(expected))
        && record.len() >= CSV_HEADER.len()
}

/// Raw 1e-7 degrees to the canonical four-decimal tag text, truncating.
fn parse_coordinate(raw: &str) -> Result<String, MapperError> {
    let value = raw
        .parse::<i64>()
        .map_err(|e| MapperError::InvalidCoordinate(format!("{raw:?}: {e}")))?;
    Ok(format_signed(value / RAW_PER_SCALED))
}

/// Writes the metrics the store does not have yet, returning how many points
/// the store accepted.
///
/// A metric counts as present when a point with the same tags exists,
/// newer than `since` when given.
pub async fn import_missing(
    store: &dyn Store,
    metrics: Vec<Metric>,
    since: Option<DateTime<Utc>>,
) -> Result<usize, MapperError> {
    let mut missing = Vec::new();
    for metric in metrics {
        if !store.has_metric(&metric, since).await {
            debug!(tags = ?metric.tags(), "add metric");
            missing.push(metric);
        }
    }

    let added = if missing.is_empty() {
        0
    } else {
        store.write(&missing).await?
    };

    info!(missing = missing.len(), amount = added, "metrics added");
    Ok(added)
}
