//! # lora-mapper
//!
//! Stores geotagged LoRa reception scans in InfluxDB, serves coverage maps and
//! answers "which data rate works here?" for a position.
//!
//! There are currently four main entry points.
//!
//! ### 1. `compile` - Coordinate Interval to Regex
//!
//! Coordinates are stored as tags with exactly four decimals. A band of
//! degrees becomes an alternation matching exactly the tag values inside it:
//!
//! ```
//! use lora_mapper::{anchored, compile};
//!
//! # fn main() -> Result<(), lora_mapper::MapperError> {
//! let pattern = compile(50.8600, 50.8617)?;
//! assert_eq!(pattern, r"50\.860[0-9]|50\.861[0-7]");
//! println!("latitude =~ /{}/", anchored(&pattern));
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. `bounding_box` - Search Area
//!
//! ```
//! use lora_mapper::{LatLon, bounding_box};
//!
//! # fn main() -> Result<(), lora_mapper::MapperError> {
//! let bbox = bounding_box(&LatLon::new(50.8609, 4.6818), 100.0)?;
//! assert!(bbox.bottom < 50.8609 && 50.8609 < bbox.top);
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. `SpreadingFactorResolver` - Best Data Rate Around a Position
//!
//! ```no_run
//! use lora_mapper::{DdrConfig, InfluxDb, InfluxOptions, LatLon, SpreadingFactorResolver};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), lora_mapper::MapperError> {
//! let store = InfluxDb::connect(InfluxOptions::default()).await?;
//! let resolver = SpreadingFactorResolver::new(Arc::new(store), DdrConfig::new(100.0, "coverage"));
//! let rate = resolver.resolve(&LatLon::new(50.8609, 4.6818)).await?;
//! println!("{rate}"); // e.g. SF7BW125
//! # Ok(())
//! # }
//! ```
//!
//! ### 4. `SodaqParser` - Logger Import
//!
//! ```no_run
//! use lora_mapper::{InfluxDb, InfluxOptions, SodaqParser, import_missing};
//!
//! # async fn run() -> Result<(), lora_mapper::MapperError> {
//! let store = InfluxDb::connect(InfluxOptions::default()).await?;
//! let metrics = SodaqParser::new("coverage")
//!     .default_tag("device_id", "sodaq-1")
//!     .parse_file("scans.csv")?;
//! import_missing(&store, metrics, None).await?;
//! # Ok(())
//! # }
//! ```
//!

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod model;
pub mod store;
pub mod util;
pub mod web;

pub use crate::core::{
    BoundingBox, DEFAULT_BANDWIDTH, DEFAULT_MEASUREMENT, DEFAULT_RADIUS, MAX_SPREADING_FACTOR,
    METERS_PER_DEGREE_LATITUDE, MIN_SPREADING_FACTOR, PRECISION, ScaledRange, anchored,
    bounding_box, compile, compile_scaled, decompose, decompose_with_width, format, from_scaled,
    merge_overlapping, render, to_scaled,
};
pub use api::{
    DEFAULT_CALLBACK, DdrConfig, GeoJsonExporter, SodaqParser, SpreadingFactorResolver,
    best_data_rate, import_missing,
};
pub use config::Config;
pub use model::{DataRate, FieldValue, Metric, Series};
pub use store::{InfluxDb, InfluxOptions, Precision, Store};
pub use util::{Coordinate, LatLon, MapperError};

pub use geo_types;
