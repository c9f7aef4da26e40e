use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single field value as stored by InfluxDB.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl FieldValue {
    /// Converts a JSON value from a query response. `null` and nested values
    /// have no field representation.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Boolean(b) => Value::from(*b),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One measurement point: name, tags, fields and an optional timestamp.
///
/// Without a timestamp the store assigns its own on write.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    name: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    time: Option<DateTime<Utc>>,
}

impl Metric {
    pub fn new(
        name: impl Into<String>,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, FieldValue>,
        time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            tags,
            fields,
            time,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Adds or replaces a tag.
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Adds or replaces a field.
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }
}

/// A group of rows sharing a measurement name and tag set, as returned by a
/// `group by` query. Every row already carries the group tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub name: String,
    pub tags: BTreeMap<String, String>,
    pub rows: Vec<Metric>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_accessors() {
        let mut metric = Metric::new("coverage", BTreeMap::new(), BTreeMap::new(), None);
        metric.add_tag("latitude", "50.8609");
        metric.add_field("rssi", -97i64);

        assert_eq!(metric.name(), "coverage");
        assert_eq!(metric.tag("latitude"), Some("50.8609"));
        assert!(metric.has_tag("latitude"));
        assert!(!metric.has_tag("data_rate"));
        assert!(metric.has_field("rssi"));
        assert_eq!(metric.field("rssi"), Some(&FieldValue::Integer(-97)));
        assert_eq!(metric.time(), None);
    }

    #[test]
    fn test_add_tag_replaces() {
        let mut metric = Metric::new("coverage", BTreeMap::new(), BTreeMap::new(), None);
        metric.add_tag("data_rate", "SF7BW125");
        metric.add_tag("data_rate", "SF8BW125");
        assert_eq!(metric.tags().len(), 1);
        assert_eq!(metric.tag("data_rate"), Some("SF8BW125"));
    }

    #[test]
    fn test_field_value_from_json() {
        assert_eq!(FieldValue::from_json(&json!(-97)), Some(FieldValue::Integer(-97)));
        assert_eq!(FieldValue::from_json(&json!(7.5)), Some(FieldValue::Float(7.5)));
        assert_eq!(FieldValue::from_json(&json!(true)), Some(FieldValue::Boolean(true)));
        assert_eq!(
            FieldValue::from_json(&json!("SF9BW125")),
            Some(FieldValue::Text("SF9BW125".into()))
        );
        assert_eq!(FieldValue::from_json(&json!(null)), None);
        assert_eq!(FieldValue::from_json(&json!([1, 2])), None);
    }

    #[test]
    fn test_field_value_to_json() {
        assert_eq!(FieldValue::Integer(-97).to_json(), json!(-97));
        assert_eq!(FieldValue::Text("a".into()).to_json(), json!("a"));
        assert_eq!(FieldValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(FieldValue::Integer(3).as_str(), None);
    }
}
