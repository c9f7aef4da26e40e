pub mod influx;
pub mod influxql;
pub mod line_protocol;

#[cfg(test)]
pub(crate) mod mock;

pub use influx::{InfluxDb, InfluxOptions};
pub use line_protocol::Precision;

use crate::model::{Metric, Series};
use crate::util::error::MapperError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

/// Time-series backend holding the coverage scans.
///
/// Only `ping`, `query` and `write` talk to the backend; the other methods
/// are built on top of `query`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), MapperError>;

    /// Runs an InfluxQL command and returns every series of every statement.
    async fn query(&self, command: &str) -> Result<Vec<Series>, MapperError>;

    /// Writes the points, returning how many were sent. Points that cannot
    /// be encoded are skipped and not counted.
    async fn write(&self, metrics: &[Metric]) -> Result<usize, MapperError>;

    /// All points of a measurement, optionally narrowed by a `where` clause.
    async fn query_measurement(
        &self,
        measurement: &str,
        filter: Option<&str>,
    ) -> Result<Vec<Series>, MapperError> {
        self.query(&influxql::select_measurement(measurement, filter))
            .await
    }

    /// Whether a point with the same name and tags exists, newer than `since`
    /// when given. Lookup failures count as absent.
    async fn has_metric(&self, metric: &Metric, since: Option<DateTime<Utc>>) -> bool {
        let command = influxql::select_matching(metric, since);
        match self.query(&command).await {
            Ok(series) => !series.is_empty(),
            Err(err) => {
                warn!(error = %err, measurement = metric.name(), "metric lookup failed");
                false
            }
        }
    }
}
