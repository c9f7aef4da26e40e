//! Best data rate lookup around a position.

use crate::core::bounds::bounding_box;
use crate::core::constants::{
    DEFAULT_MEASUREMENT, DEFAULT_RADIUS, MAX_DEGREES, MAX_SPREADING_FACTOR,
};
use crate::core::pattern::compile;
use crate::model::{DataRate, FieldValue, Metric, Series};
use crate::store::{Store, influxql};
use crate::util::coord::{Coordinate, LatLon};
use crate::util::error::MapperError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Search settings of the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdrConfig {
    /// Search radius in meters.
    pub radius: f64,
    /// Measurement holding the coverage scans.
    pub measurement: String,
}

impl DdrConfig {
    pub fn new(radius: f64, measurement: impl Into<String>) -> Self {
        Self {
            radius,
            measurement: measurement.into(),
        }
        .normalized()
    }

    /// Replaces a non-positive radius and an empty measurement by their defaults.
    pub fn normalized(mut self) -> Self {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            self.radius = DEFAULT_RADIUS;
        }
        if self.measurement.trim().is_empty() {
            self.measurement = DEFAULT_MEASUREMENT.to_string();
        }
        self
    }
}

impl Default for DdrConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            measurement: DEFAULT_MEASUREMENT.to_string(),
        }
    }
}

/// Finds the lowest spreading factor measured within a radius of a position.
///
/// # Example
/// ```no_run
/// use lora_mapper::{DdrConfig, InfluxDb, InfluxOptions, LatLon, SpreadingFactorResolver};
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), lora_mapper::MapperError> {
/// let store = InfluxDb::connect(InfluxOptions::default()).await?;
/// let resolver = SpreadingFactorResolver::new(Arc::new(store), DdrConfig::default());
///
/// let rate = resolver.resolve(&LatLon::new(50.8609, 4.6818)).await?;
/// println!("{rate}");
/// # Ok(())
/// # }
/// ```
pub struct SpreadingFactorResolver {
    store: Arc<dyn Store>,
    config: DdrConfig,
}

impl SpreadingFactorResolver {
    pub fn new(store: Arc<dyn Store>, config: DdrConfig) -> Self {
        Self {
            store,
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &DdrConfig {
        &self.config
    }

    /// The query selecting every distinct data rate per location inside the
    /// search box of `center`.
    ///
    /// Band edges past `0` or `180` degrees are clipped, so a box around a
    /// centre near the equator or the prime meridian still compiles. A
    /// negative centre leaves an empty band and is rejected.
    pub fn build_query<C: Coordinate>(&self, center: &C) -> Result<String, MapperError> {
        let bbox = bounding_box(center, self.config.radius)?;
        let (bottom, top) = clip(bbox.latitude_band());
        let (left, right) = clip(bbox.longitude_band());

        let latitude = compile(bottom, top)?;
        let longitude = compile(left, right)?;

        Ok(influxql::data_rate_query(
            &self.config.measurement,
            &latitude,
            &longitude,
        ))
    }

    /// Best data rate around `center`, `SF12BW125` when nothing was measured.
    pub async fn resolve<C: Coordinate + Sync>(&self, center: &C) -> Result<DataRate, MapperError> {
        let command = self.build_query(center)?;
        let series = self.store.query(&command).await?;
        let rate = best_data_rate(&series);

        debug!(
            latitude = center.latitude(),
            longitude = center.longitude(),
            locations = series.len(),
            %rate,
            "resolved data rate"
        );
        Ok(rate)
    }
}

fn clip((low, high): (f64, f64)) -> (f64, f64) {
    (low.max(0.0), high.min(MAX_DEGREES))
}

fn data_rate_value(row: &Metric) -> Option<&str> {
    row.field("data_rate")
        .and_then(FieldValue::as_str)
        .or_else(|| row.tag("data_rate"))
}

/// Location and lowest spreading factor of one location group.
///
/// Rows missing a location or a data rate, or with values that do not parse,
/// are skipped. The location comes from the first row where it parses and
/// stays `(0, 0)` when none does.
pub fn reduce_series(series: &Series) -> (LatLon, u8) {
    let mut location = LatLon::new(0.0, 0.0);
    let mut best = MAX_SPREADING_FACTOR;

    for row in &series.rows {
        let (Some(lat), Some(lon), Some(rate)) = (
            row.tag("latitude"),
            row.tag("longitude"),
            data_rate_value(row),
        ) else {
            warn!(series = %series.name, tags = ?row.tags(), "row without location or data rate");
            continue;
        };

        if location.latitude == 0.0 {
            match lat.parse::<f64>() {
                Ok(value) => location.latitude = value,
                Err(err) => {
                    warn!(latitude = lat, error = %err, "unreadable latitude");
                    continue;
                }
            }
        }

        if location.longitude == 0.0 {
            match lon.parse::<f64>() {
                Ok(value) => location.longitude = value,
                Err(err) => {
                    warn!(longitude = lon, error = %err, "unreadable longitude");
                    continue;
                }
            }
        }

        match DataRate::parse(rate) {
            Ok(rate) => best = best.min(rate.spreading_factor()),
            Err(err) => warn!(error = %err, "unreadable data rate"),
        }
    }

    (location, best)
}

/// Lowest spreading factor over all located groups, at 125 kHz.
pub fn best_data_rate(series: &[Series]) -> DataRate {
    let spreading_factor = series
        .iter()
        .map(reduce_series)
        .filter(|(location, _)| location.latitude != 0.0 && location.longitude != 0.0)
        .map(|(_, sf)| sf)
        .min()
        .unwrap_or(MAX_SPREADING_FACTOR);

    DataRate {
        spreading_factor,
        ..DataRate::slowest()
    }
}
