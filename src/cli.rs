//! Command-line parsing.

use crate::model::DataRate;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "lora-mapper", version, about = "LoRa coverage mapper backed by InfluxDB")]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "LORA_MAPPER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the maps, the GeoJSON feeds and the data rate lookup.
    Start,
    /// Import a Sodaq One logger file, adding only the points the database is missing.
    Add(AddArgs),
    /// Write the points of one data rate to a JSONP file.
    Geojson(GeojsonArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Logger CSV file.
    pub file: PathBuf,

    /// Tag every point with this device id.
    #[arg(long)]
    pub device_id: Option<String>,

    /// Only compare against points newer than this (RFC 3339).
    #[arg(long)]
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Args)]
pub struct GeojsonArgs {
    /// Data rate, e.g. SF7BW125.
    pub data_rate: DataRate,

    /// Name of the JSONP callback function.
    #[arg(short, long, default_value = crate::api::exporter::DEFAULT_CALLBACK)]
    pub callback: String,

    /// Output file.
    #[arg(short, long, default_value = "data_geo.json")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_arguments() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "lora-mapper",
            "add",
            "scans.csv",
            "--device-id",
            "sodaq-1",
            "--time",
            "2018-04-01T12:06:00Z",
        ])?;

        let args = match cli.command {
            Command::Add(args) => args,
            other => panic!("expected add, got {other:?}"),
        };
        assert_eq!(args.file, PathBuf::from("scans.csv"));
        assert_eq!(args.device_id.as_deref(), Some("sodaq-1"));
        assert_eq!(args.time.map(|t| t.timestamp()), Some(1522584360));
        Ok(())
    }

    #[test]
    fn test_geojson_defaults() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["lora-mapper", "geojson", "SF9BW125"])?;

        let args = match cli.command {
            Command::Geojson(args) => args,
            other => panic!("expected geojson, got {other:?}"),
        };
        assert_eq!(args.data_rate.spreading_factor(), 9);
        assert_eq!(args.callback, "eqfeed_callback");
        assert_eq!(args.output, PathBuf::from("data_geo.json"));
        Ok(())
    }

    #[test]
    fn test_global_config_flag() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["lora-mapper", "start", "--config", "mapper.toml"])?;
        assert!(matches!(cli.command, Command::Start));
        assert_eq!(cli.config, Some(PathBuf::from("mapper.toml")));
        Ok(())
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["lora-mapper", "geojson", "SF13BW125"]).is_err());
        assert!(
            Cli::try_parse_from(["lora-mapper", "add", "scans.csv", "--time", "today"]).is_err()
        );
        assert!(Cli::try_parse_from(["lora-mapper", "add"]).is_err());
    }
}
