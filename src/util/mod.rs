pub mod coord;
pub mod error;

pub use coord::{Coordinate, LatLon};
pub use error::MapperError;
