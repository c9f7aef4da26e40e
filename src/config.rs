//! Runtime configuration: a TOML file, `.env`, then environment overrides.

use crate::api::ddr::DdrConfig;
use crate::core::constants::{DEFAULT_MEASUREMENT, DEFAULT_RADIUS};
use crate::store::InfluxOptions;
use crate::util::error::MapperError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variables overriding the `[influxdb]` section.
pub const ENV_INFLUXDB_URL: &str = "INFLUXDB_URL";
pub const ENV_INFLUXDB_USERNAME: &str = "INFLUXDB_USERNAME";
pub const ENV_INFLUXDB_PASSWORD: &str = "INFLUXDB_PASSWORD";
pub const ENV_INFLUXDB_DATABASE: &str = "INFLUXDB_DATABASE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub influxdb: InfluxOptions,
    pub web: WebConfig,
    pub metric: MetricConfig,
    pub ddr: DdrSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address, `host:port`.
    pub address: String,
    /// Path prefix all routes are mounted under, empty for the root.
    pub base_url: String,
    /// Directory holding the `maps/` pages.
    pub assets: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".to_string(),
            base_url: String::new(),
            assets: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    /// Measurement the scans are stored in.
    pub name: String,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MEASUREMENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdrSection {
    /// Search radius in meters.
    pub radius: f64,
}

impl Default for DdrSection {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
        }
    }
}

impl Config {
    /// Loads `.env`, the optional config file and the environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, MapperError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "loaded .env");
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, MapperError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MapperError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, MapperError> {
        toml::from_str(text).map_err(|e| MapperError::Config(e.to_string()))
    }

    /// Applies the `INFLUXDB_*` overrides found by `lookup`. Empty values are
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key| lookup(key).filter(|v: &String| !v.is_empty());

        if let Some(url) = get(ENV_INFLUXDB_URL) {
            self.influxdb.url = url;
        }
        if let Some(username) = get(ENV_INFLUXDB_USERNAME) {
            self.influxdb.username = username;
        }
        if let Some(password) = get(ENV_INFLUXDB_PASSWORD) {
            self.influxdb.password = password;
        }
        if let Some(database) = get(ENV_INFLUXDB_DATABASE) {
            self.influxdb.database = database;
        }
    }

    /// Resolver settings, with defaults for unusable values.
    pub fn ddr_config(&self) -> DdrConfig {
        DdrConfig::new(self.ddr.radius, self.metric.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Precision;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() -> Result<(), MapperError> {
        let config = Config::from_toml("")?;
        assert_eq!(config, Config::default());
        assert_eq!(config.influxdb.url, "http://localhost:8086");
        assert_eq!(config.influxdb.database, "lora");
        assert_eq!(config.influxdb.precision, Precision::Seconds);
        assert_eq!(config.web.address, "0.0.0.0:8080");
        assert_eq!(config.web.assets, PathBuf::from("."));
        assert_eq!(config.metric.name, "coverage");
        assert_eq!(config.ddr.radius, 100.0);
        Ok(())
    }

    #[test]
    fn test_partial_file() -> Result<(), MapperError> {
        let config = Config::from_toml(
            r#"
            [influxdb]
            url = "http://influx:8086"
            precision = "ms"

            [web]
            base_url = "/mapper"

            [ddr]
            radius = 250.0
            "#,
        )?;

        assert_eq!(config.influxdb.url, "http://influx:8086");
        assert_eq!(config.influxdb.database, "lora");
        assert_eq!(config.influxdb.precision, Precision::Milliseconds);
        assert_eq!(config.web.base_url, "/mapper");
        assert_eq!(config.web.address, "0.0.0.0:8080");
        assert_eq!(config.ddr_config(), DdrConfig::new(250.0, "coverage"));
        Ok(())
    }

    #[test]
    fn test_invalid_file() {
        assert!(matches!(
            Config::from_toml("[ddr]\nradius = \"far\""),
            Err(MapperError::Config(_))
        ));
        assert!(matches!(
            Config::from_file(Path::new("/nonexistent/lora-mapper.toml")),
            Err(MapperError::Config(_))
        ));
    }

    #[test]
    fn test_from_file() -> Result<(), MapperError> {
        let mut file = NamedTempFile::new().map_err(|e| MapperError::Io(e.to_string()))?;
        writeln!(file, "[metric]\nname = \"scans\"").map_err(|e| MapperError::Io(e.to_string()))?;

        let config = Config::from_file(file.path())?;
        assert_eq!(config.metric.name, "scans");
        assert_eq!(config.ddr_config().measurement, "scans");
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<(), MapperError> {
        let env = HashMap::from([
            (ENV_INFLUXDB_URL, "http://db:8086"),
            (ENV_INFLUXDB_USERNAME, "mapper"),
            (ENV_INFLUXDB_DATABASE, ""),
        ]);

        let mut config = Config::from_toml("[influxdb]\ndatabase = \"scans\"")?;
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.influxdb.url, "http://db:8086");
        assert_eq!(config.influxdb.username, "mapper");
        assert_eq!(config.influxdb.password, "");
        assert_eq!(config.influxdb.database, "scans");
        Ok(())
    }

    #[test]
    fn test_bad_ddr_values_fall_back() -> Result<(), MapperError> {
        let config = Config::from_toml("[ddr]\nradius = -1.0\n[metric]\nname = \"\"")?;
        assert_eq!(config.ddr_config(), DdrConfig::default());
        Ok(())
    }
}
