use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Anything that can be read as a WGS84 position.
pub trait Coordinate {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

/// A query center in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl Coordinate for LatLon {
    fn latitude(&self) -> f64 { self.latitude }
    fn longitude(&self) -> f64 { self.longitude }
}

/// Points follow the GeoJSON axis order: x is longitude, y is latitude.
impl Coordinate for Point<f64> {
    fn latitude(&self) -> f64 { self.y() }
    fn longitude(&self) -> f64 { self.x() }
}

impl From<Point<f64>> for LatLon {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}
