//! Coverage points as JSONP-wrapped GeoJSON, for map pages.

use crate::model::{DataRate, Metric, Series};
use crate::store::{Store, influxql};
use crate::util::coord::LatLon;
use crate::util::error::MapperError;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use std::sync::Arc;
use tracing::warn;

/// Callback name used by the bundled map pages.
pub const DEFAULT_CALLBACK: &str = "eqfeed_callback";

pub struct GeoJsonExporter {
    store: Arc<dyn Store>,
    measurement: String,
    callback: String,
}

impl GeoJsonExporter {
    pub fn new(
        store: Arc<dyn Store>,
        measurement: impl Into<String>,
        callback: impl Into<String>,
    ) -> Self {
        Self {
            store,
            measurement: measurement.into(),
            callback: callback.into(),
        }
    }

    pub fn callback(&self) -> &str {
        &self.callback
    }

    pub async fn all(&self) -> Result<String, MapperError> {
        self.export(None).await
    }

    pub async fn by_data_rate(&self, rate: &DataRate) -> Result<String, MapperError> {
        self.export(Some(influxql::tag_equals("data_rate", &rate.to_string())))
            .await
    }

    pub async fn by_gateway(&self, gateway: &str) -> Result<String, MapperError> {
        self.export(Some(influxql::tag_equals("gateway_id", gateway)))
            .await
    }

    pub async fn by_gateway_and_data_rate(
        &self,
        gateway: &str,
        rate: &DataRate,
    ) -> Result<String, MapperError> {
        let filter = format!(
            "{} and {}",
            influxql::tag_equals("gateway_id", gateway),
            influxql::tag_equals("data_rate", &rate.to_string())
        );
        self.export(Some(filter)).await
    }

    async fn export(&self, filter: Option<String>) -> Result<String, MapperError> {
        let series = self
            .store
            .query_measurement(&self.measurement, filter.as_deref())
            .await?;
        wrap_callback(&self.callback, &feature_collection(&series))
    }
}

fn location(metric: &Metric) -> Option<LatLon> {
    let latitude = metric.tag("latitude")?.parse().ok()?;
    let longitude = metric.tag("longitude")?.parse().ok()?;
    Some(LatLon::new(latitude, longitude))
}

fn point_feature(metric: &Metric) -> Option<Feature> {
    let location = location(metric)?;

    let mut properties = JsonObject::new();
    if let Some(rssi) = metric.field("rssi") {
        properties.insert("rssi".to_string(), rssi.to_json());
    }
    if let Some(rate) = metric.tag("data_rate") {
        properties.insert("data_rate".to_string(), rate.into());
    }

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&location.to_point()))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// One point feature per located row, at `[longitude, latitude]`.
pub fn feature_collection(series: &[Series]) -> FeatureCollection {
    let features = series
        .iter()
        .flat_map(|s| &s.rows)
        .filter_map(|metric| {
            let feature = point_feature(metric);
            if feature.is_none() {
                warn!(tags = ?metric.tags(), "row without a readable location");
            }
            feature
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// `callback(<collection>);`
pub fn wrap_callback(
    callback: &str,
    collection: &FeatureCollection,
) -> Result<String, MapperError> {
    let json =
        serde_json::to_string(collection).map_err(|e| MapperError::GeoJson(e.to_string()))?;
    Ok(format!("{callback}({json});"))
}
