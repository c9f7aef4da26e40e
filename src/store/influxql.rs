//! InfluxQL command builders.

use crate::core::pattern::anchored;
use crate::model::Metric;
use chrono::{DateTime, SecondsFormat, Utc};

/// Double-quoted identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Single-quoted string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// `"key" = 'value'`
pub fn tag_equals(key: &str, value: &str) -> String {
    format!("{} = {}", quote_ident(key), quote_literal(value))
}

pub fn select_measurement(measurement: &str, filter: Option<&str>) -> String {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(filter) => format!(
            "select * from {} where {filter} group by *",
            quote_ident(measurement)
        ),
        None => format!("select * from {} group by *", quote_ident(measurement)),
    }
}

/// Selects points sharing every tag of `metric`, newer than `since` if given.
pub fn select_matching(metric: &Metric, since: Option<DateTime<Utc>>) -> String {
    let mut conditions: Vec<String> = Vec::new();
    if let Some(since) = since {
        conditions.push(format!(
            "time >= {}",
            quote_literal(&since.to_rfc3339_opts(SecondsFormat::Secs, true))
        ));
    }
    conditions.extend(metric.tags().iter().map(|(k, v)| tag_equals(k, v)));

    let filter = conditions.join(" and ");
    select_measurement(metric.name(), Some(&filter))
}

/// Distinct data rates per location inside the latitude and longitude
/// patterns, restricted to points that actually received something.
///
/// The patterns are anchored here; pass them as compiled.
pub fn data_rate_query(
    measurement: &str,
    latitude_pattern: &str,
    longitude_pattern: &str,
) -> String {
    format!(
        "select distinct(data_rate) as \"data_rate\" from \
         (select rssi, snr, data_rate from {} where rssi < 0 \
         and latitude =~ /{}/ and longitude =~ /{}/ \
         group by latitude, longitude) \
         group by latitude, longitude",
        quote_ident(measurement),
        anchored(latitude_pattern),
        anchored(longitude_pattern),
    )
}
