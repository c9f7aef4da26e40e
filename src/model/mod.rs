pub mod data_rate;
pub mod metric;

pub use data_rate::DataRate;
pub use metric::{FieldValue, Metric, Series};
