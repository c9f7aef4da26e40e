pub mod ddr;
pub mod exporter;
pub mod sodaq;

pub use ddr::{DdrConfig, SpreadingFactorResolver, best_data_rate};
pub use exporter::{DEFAULT_CALLBACK, GeoJsonExporter};
pub use sodaq::{SodaqParser, import_missing};
