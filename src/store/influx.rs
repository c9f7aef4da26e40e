use super::Store;
use super::line_protocol::{self, Precision};
use crate::model::{FieldValue, Metric, Series};
use crate::util::error::MapperError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const PING_TIMEOUT: Duration = Duration::from_secs(3);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for an InfluxDB 1.x server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxOptions {
    pub url: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub precision: Precision,
}

impl Default for InfluxOptions {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            username: String::new(),
            password: String::new(),
            database: "lora".to_string(),
            precision: Precision::default(),
        }
    }
}

/// InfluxDB 1.x client over the HTTP API.
pub struct InfluxDb {
    client: Client,
    options: InfluxOptions,
}

impl InfluxDb {
    pub fn new(options: InfluxOptions) -> Result<Self, MapperError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MapperError::Connection(e.to_string()))?;
        Ok(Self { client, options })
    }

    /// Builds a client and checks the server answers a ping.
    pub async fn connect(options: InfluxOptions) -> Result<Self, MapperError> {
        let db = Self::new(options)?;
        db.ping().await?;
        info!(url = %db.options.url, database = %db.options.database, "connected to InfluxDB");
        Ok(db)
    }

    pub fn options(&self) -> &InfluxOptions {
        &self.options
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.options.url.trim_end_matches('/'), path)
    }

    fn credentials(&self) -> Vec<(&'static str, &str)> {
        if self.options.username.is_empty() {
            Vec::new()
        } else {
            vec![
                ("u", self.options.username.as_str()),
                ("p", self.options.password.as_str()),
            ]
        }
    }
}

#[async_trait]
impl Store for InfluxDb {
    async fn ping(&self) -> Result<(), MapperError> {
        let response = self
            .client
            .get(self.endpoint("ping"))
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .map_err(|e| MapperError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MapperError::Connection(format!(
                "ping answered {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn query(&self, command: &str) -> Result<Vec<Series>, MapperError> {
        debug!(%command, "query");

        let response = self
            .client
            .get(self.endpoint("query"))
            .query(&[("db", self.options.database.as_str()), ("q", command)])
            .query(&self.credentials())
            .send()
            .await
            .map_err(|e| MapperError::Connection(e.to_string()))?;

        let status = response.status();
        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| MapperError::Query(format!("{status}: {e}")))?;

        decode_response(body)
    }

    async fn write(&self, metrics: &[Metric]) -> Result<usize, MapperError> {
        let batch = line_protocol::encode_batch(metrics, self.options.precision);
        if batch.is_empty() {
            return Ok(0);
        }

        let response = self
            .client
            .post(self.endpoint("write"))
            .query(&[
                ("db", self.options.database.as_str()),
                ("precision", self.options.precision.as_str()),
            ])
            .query(&self.credentials())
            .body(batch.body)
            .send()
            .await
            .map_err(|e| MapperError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MapperError::Query(format!("write answered {status}: {text}")));
        }
        Ok(batch.points)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<RawSeries>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl RawSeries {
    /// One metric per value row. Rows whose `time` does not parse are dropped.
    fn into_series(self) -> Series {
        let rows = self
            .values
            .iter()
            .filter_map(|values| self.row(values))
            .collect();

        Series {
            name: self.name,
            tags: self.tags,
            rows,
        }
    }

    fn row(&self, values: &[Value]) -> Option<Metric> {
        let mut fields = BTreeMap::new();
        let mut time = None;

        for (column, value) in self.columns.iter().zip(values) {
            if column == "time" {
                if let Value::String(t) = value {
                    match DateTime::parse_from_rfc3339(t) {
                        Ok(t) => time = Some(t.with_timezone(&Utc)),
                        Err(err) => {
                            warn!(series = %self.name, time = %t, error = %err, "unreadable time");
                            return None;
                        }
                    }
                }
                continue;
            }
            if let Some(field) = FieldValue::from_json(value) {
                fields.insert(column.clone(), field);
            }
        }

        Some(Metric::new(self.name.clone(), self.tags.clone(), fields, time))
    }
}

fn decode_response(response: QueryResponse) -> Result<Vec<Series>, MapperError> {
    if let Some(err) = response.error {
        return Err(MapperError::Query(err));
    }

    let mut series = Vec::new();
    for result in response.results {
        if let Some(err) = result.error {
            return Err(MapperError::Query(err));
        }
        for raw in result.series {
            debug!(name = %raw.name, tags = ?raw.tags, rows = raw.values.len(), "series");
            series.push(raw.into_series());
        }
    }
    Ok(series)
}
