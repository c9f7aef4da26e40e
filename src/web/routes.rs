use super::AppState;
use crate::api::exporter::{DEFAULT_CALLBACK, GeoJsonExporter};
use crate::model::DataRate;
use crate::util::coord::LatLon;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

const INDEX_HTML: &str = r#"<!DOCTYPE HTML>
<html>
  <head>
    <meta charset="utf-8">
    <title>LoRa Coverage</title>
  </head>
  <body>
    <ul>
      <li><a href="maps/coverage.html">All Spreading Factors</a></li>
      <li><a href="maps/sf7bw125.html">SF7 BW125</a></li>
      <li><a href="maps/sf8bw125.html">SF8 BW125</a></li>
      <li><a href="maps/sf9bw125.html">SF9 BW125</a></li>
      <li><a href="maps/sf10bw125.html">SF10 BW125</a></li>
      <li><a href="maps/sf11bw125.html">SF11 BW125</a></li>
      <li><a href="maps/sf12bw125.html">SF12 BW125</a></li>
    </ul>
  </body>
</html>
"#;

fn status(code: StatusCode) -> Response {
    (code, code.canonical_reason().unwrap_or_default()).into_response()
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Deserialize)]
pub struct DdrParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DdrResponse {
    pub datarate: String,
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value?.trim().parse().ok()
}

/// `GET /ddr/q?lat=..&lon=..`
pub async fn ddr(State(state): State<AppState>, Query(params): Query<DdrParams>) -> Response {
    let (Some(latitude), Some(longitude)) = (
        parse_coordinate(params.lat.as_deref()),
        parse_coordinate(params.lon.as_deref()),
    ) else {
        error!(lat = ?params.lat, lon = ?params.lon, "handle ddr: unreadable position");
        return status(StatusCode::INTERNAL_SERVER_ERROR);
    };

    match state.resolver.resolve(&LatLon::new(latitude, longitude)).await {
        Ok(rate) => Json(DdrResponse {
            datarate: rate.to_string(),
        })
        .into_response(),
        Err(err) => {
            error!(error = %err, latitude, longitude, "handle ddr");
            status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeoJsonParams {
    pub callback: Option<String>,
    pub gateway: Option<String>,
}

/// `sf7` … `sf12`, or `None` for `all`.
fn parse_route_rate(segment: &str) -> Result<Option<DataRate>, ()> {
    if segment.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    let sf = segment
        .get(..2)
        .filter(|prefix| prefix.eq_ignore_ascii_case("sf"))
        .and_then(|_| segment[2..].parse::<u8>().ok())
        .ok_or(())?;
    DataRate::new(sf).map(Some).map_err(|_| ())
}

fn valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

/// `GET /geojson/{sf|all}?callback=..&gateway=..`
pub async fn geojson(
    State(state): State<AppState>,
    Path(data_rate): Path<String>,
    Query(params): Query<GeoJsonParams>,
) -> Response {
    let Ok(rate) = parse_route_rate(&data_rate) else {
        return status(StatusCode::NOT_FOUND);
    };

    let callback = params
        .callback
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CALLBACK.to_string());
    if !valid_callback(&callback) {
        return status(StatusCode::BAD_REQUEST);
    }

    let exporter = GeoJsonExporter::new(state.store.clone(), state.measurement.clone(), callback);
    let gateway = params.gateway.as_deref().filter(|g| !g.is_empty());

    let result = match (gateway, rate) {
        (None, None) => exporter.all().await,
        (None, Some(rate)) => exporter.by_data_rate(&rate).await,
        (Some(gateway), None) => exporter.by_gateway(gateway).await,
        (Some(gateway), Some(rate)) => exporter.by_gateway_and_data_rate(gateway, &rate).await,
    };

    match result {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => {
            error!(error = %err, data_rate = %data_rate, "handle geojson");
            status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
