//! Command dispatch behind the `lora-mapper` binary.

use crate::api::exporter::GeoJsonExporter;
use crate::api::sodaq::{SodaqParser, import_missing};
use crate::cli::{AddArgs, Cli, Command, GeojsonArgs};
use crate::config::Config;
use crate::store::{InfluxDb, Store};
use crate::util::error::MapperError;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "lora_mapper=info,tower_http=info";

/// Installs the `RUST_LOG`-driven subscriber. Later calls are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn run() -> Result<(), MapperError> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load(cli.config.as_deref())?;
    debug!(
        url = %config.influxdb.url,
        username = %config.influxdb.username,
        database = %config.influxdb.database,
        precision = config.influxdb.precision.as_str(),
        "InfluxDB options"
    );

    let store = InfluxDb::connect(config.influxdb.clone()).await?;

    match cli.command {
        Command::Start => crate::web::serve(&config, Arc::new(store)).await,
        Command::Add(args) => handle_add(&config, &store, args).await,
        Command::Geojson(args) => handle_geojson(&config, Arc::new(store), args).await,
    }
}

async fn handle_add(config: &Config, store: &dyn Store, args: AddArgs) -> Result<(), MapperError> {
    let mut parser = SodaqParser::new(config.metric.name.clone());
    if let Some(device_id) = args.device_id.filter(|id| !id.is_empty()) {
        parser = parser.default_tag("device_id", device_id);
    }

    let metrics = parser.parse_file(&args.file)?;
    info!(file = %args.file.display(), parsed = metrics.len(), "data file read");

    import_missing(store, metrics, args.time).await?;
    Ok(())
}

async fn handle_geojson(
    config: &Config,
    store: Arc<dyn Store>,
    args: GeojsonArgs,
) -> Result<(), MapperError> {
    let exporter = GeoJsonExporter::new(store, config.metric.name.clone(), args.callback.clone());
    let data = exporter.by_data_rate(&args.data_rate).await?;

    tokio::fs::write(&args.output, data)
        .await
        .map_err(|e| MapperError::Io(format!("{}: {e}", args.output.display())))?;

    info!(
        filename = %args.output.display(),
        sf = %args.data_rate,
        callback = %args.callback,
        "geojson file written"
    );
    Ok(())
}
