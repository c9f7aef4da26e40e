use crate::core::constants::METERS_PER_DEGREE_LATITUDE;
use crate::util::coord::Coordinate;
use crate::util::error::MapperError;
use geo_types::{Rect, coord};

/// Latitude/longitude box around a search circle, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl BoundingBox {
    /// `(bottom, top)`
    pub fn latitude_band(&self) -> (f64, f64) {
        (self.bottom, self.top)
    }

    /// `(left, right)`
    pub fn longitude_band(&self) -> (f64, f64) {
        (self.left, self.right)
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.left, y: self.bottom },
            coord! { x: self.right, y: self.top },
        )
    }
}

/// Returns `(top, bottom)` for a circle of `radius` meters.
pub fn bounds_top_bottom<C: Coordinate>(center: &C, radius: f64) -> (f64, f64) {
    let difference = radius / METERS_PER_DEGREE_LATITUDE;
    (center.latitude() + difference, center.latitude() - difference)
}

/// Returns `(left, right)` for a circle of `radius` meters.
///
/// Degrees of longitude shrink with `cos(latitude)`.
pub fn bounds_left_right<C: Coordinate>(center: &C, radius: f64) -> (f64, f64) {
    let difference =
        radius / (METERS_PER_DEGREE_LATITUDE * center.latitude().to_radians().cos());
    (center.longitude() - difference, center.longitude() + difference)
}

/// Box bounding a circle of `radius` meters around `center`.
///
/// Flat-earth (equirectangular) approximation, good for radii up to a few
/// hundred meters. It is not a great-circle computation.
pub fn bounding_box<C: Coordinate>(center: &C, radius: f64) -> Result<BoundingBox, MapperError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(MapperError::InvalidCoordinate(format!(
            "radius must be positive, got {radius}"
        )));
    }

    let (lat, lon) = (center.latitude(), center.longitude());
    if !(lat.is_finite() && lat.abs() < 90.0) {
        return Err(MapperError::InvalidCoordinate(format!("latitude {lat}")));
    }
    if !(lon.is_finite() && lon.abs() <= 180.0) {
        return Err(MapperError::InvalidCoordinate(format!("longitude {lon}")));
    }

    let (top, bottom) = bounds_top_bottom(center, radius);
    let (left, right) = bounds_left_right(center, radius);

    Ok(BoundingBox {
        top,
        bottom,
        left,
        right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::coord::LatLon;
    use geo_types::point;

    #[test]
    fn test_bounding_box_symmetry() -> Result<(), MapperError> {
        let center = LatLon::new(50.8609, 4.6818);
        let bbox = bounding_box(&center, 100.0)?;

        let up = bbox.top - center.latitude;
        let down = center.latitude - bbox.bottom;
        let east = bbox.right - center.longitude;
        let west = center.longitude - bbox.left;

        assert!((up - down).abs() < 1e-12);
        assert!((east - west).abs() < 1e-12);
        assert!(up > 0.0 && east > 0.0);
        Ok(())
    }

    #[test]
    fn test_one_degree_of_latitude() -> Result<(), MapperError> {
        let bbox = bounding_box(&LatLon::new(10.0, 20.0), METERS_PER_DEGREE_LATITUDE)?;
        assert!((bbox.top - 11.0).abs() < 1e-9);
        assert!((bbox.bottom - 9.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_longitude_widens_with_latitude() -> Result<(), MapperError> {
        let equator = bounding_box(&LatLon::new(0.0, 10.0), 100.0)?;
        let sixty = bounding_box(&LatLon::new(60.0, 10.0), 100.0)?;

        let lat_width = equator.top - equator.bottom;
        let lon_width_equator = equator.right - equator.left;
        let lon_width_sixty = sixty.right - sixty.left;

        assert!((lat_width - lon_width_equator).abs() < 1e-12);
        assert!((lon_width_sixty - 2.0 * lon_width_equator).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_bounding_box_from_point() -> Result<(), MapperError> {
        let pt = point! { x: 4.6818, y: 50.8609 };
        let from_point = bounding_box(&pt, 100.0)?;
        let from_latlon = bounding_box(&LatLon::new(50.8609, 4.6818), 100.0)?;
        assert_eq!(from_point, from_latlon);
        Ok(())
    }

    #[test]
    fn test_to_rect() -> Result<(), MapperError> {
        let bbox = bounding_box(&LatLon::new(50.8609, 4.6818), 100.0)?;
        let rect = bbox.to_rect();
        assert_eq!(rect.min().x, bbox.left);
        assert_eq!(rect.min().y, bbox.bottom);
        assert_eq!(rect.max().x, bbox.right);
        assert_eq!(rect.max().y, bbox.top);
        Ok(())
    }

    #[test]
    fn test_invalid_inputs() {
        let center = LatLon::new(50.8609, 4.6818);
        assert!(bounding_box(&center, 0.0).is_err());
        assert!(bounding_box(&center, f64::NAN).is_err());
        assert!(bounding_box(&LatLon::new(90.0, 4.0), 100.0).is_err());
        assert!(bounding_box(&LatLon::new(50.0, 181.0), 100.0).is_err());
    }
}
