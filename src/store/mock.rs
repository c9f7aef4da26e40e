use super::Store;
use super::line_protocol::{self, Precision};
use crate::model::{FieldValue, Metric, Series};
use crate::util::error::MapperError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&str) -> Result<Vec<Series>, MapperError> + Send + Sync>;

/// In-memory store answering every query through a closure.
pub(crate) struct MockStore {
    responder: Responder,
    commands: Mutex<Vec<String>>,
    written: Mutex<Vec<Metric>>,
}

impl MockStore {
    pub(crate) fn new(
        responder: impl Fn(&str) -> Result<Vec<Series>, MapperError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            commands: Mutex::new(Vec::new()),
            written: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_series(series: Vec<Series>) -> Self {
        Self::new(move |_| Ok(series.clone()))
    }

    pub(crate) fn failing() -> Self {
        Self::new(|_| Err(MapperError::Connection("connection refused".into())))
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn written(&self) -> Vec<Metric> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for MockStore {
    async fn ping(&self) -> Result<(), MapperError> {
        (self.responder)("ping").map(|_| ())
    }

    async fn query(&self, command: &str) -> Result<Vec<Series>, MapperError> {
        self.commands.lock().unwrap().push(command.to_string());
        (self.responder)(command)
    }

    async fn write(&self, metrics: &[Metric]) -> Result<usize, MapperError> {
        (self.responder)("write")?;
        let encodable: Vec<Metric> = metrics
            .iter()
            .filter(|m| line_protocol::encode(m, Precision::default()).is_ok())
            .cloned()
            .collect();
        let points = encodable.len();
        self.written.lock().unwrap().extend(encodable);
        Ok(points)
    }
}

/// A row as returned by the data rate query: location tags plus a
/// `data_rate` field.
pub(crate) fn row(latitude: &str, longitude: &str, data_rate: &str) -> Metric {
    let mut fields = BTreeMap::new();
    fields.insert("data_rate".to_string(), FieldValue::from(data_rate));
    let mut metric = Metric::new("coverage", BTreeMap::new(), fields, None);
    metric.add_tag("latitude", latitude);
    metric.add_tag("longitude", longitude);
    metric
}

/// A location group built from its rows; tags are taken from the first row.
pub(crate) fn series(rows: Vec<Metric>) -> Series {
    let tags = rows.first().map(|r| r.tags().clone()).unwrap_or_default();
    Series {
        name: "coverage".to_string(),
        tags,
        rows,
    }
}
