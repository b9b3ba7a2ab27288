//! Geodesic buffering for RADIUS coverage areas.
//!
//! Each vertex is the WGS84 ellipsoidal destination (Karney's algorithm, via
//! `geo::GeodesicDestination`) from the center at an evenly spaced bearing.
//! Vertices sit on a slightly enlarged circle so that the polygon edges,
//! not just the vertices, stay outside the requested radius.
//!
//! Tolerance: with 72 vertices the boundary lies between 1.000x and 1.001x
//! the radius from the center, measured along the ellipsoid. Against the
//! spherical haversine distance used for ranking the two agree within 0.5%,
//! so the buffer is accurate to well under 1% at any latitude the buffer is
//! allowed at.

use geo::{Coord, GeodesicDestination, LineString, Point, Polygon};

use crate::common::utils::{meters_to_miles, miles_to_meters};
use crate::common::LatLon;
use crate::domains::coverage::error::ValidationError;

pub const MIN_RADIUS_MILES: f64 = 0.5;
pub const MAX_RADIUS_MILES: f64 = 100.0;

/// Number of vertices on the buffer ring (one every 5°).
pub const BUFFER_VERTICES: usize = 72;

/// Convert a user-supplied radius in miles to meters, enforcing the allowed range.
pub fn radius_meters_from_miles(miles: f64) -> Result<f64, ValidationError> {
    if !miles.is_finite() || !(MIN_RADIUS_MILES..=MAX_RADIUS_MILES).contains(&miles) {
        return Err(ValidationError::RadiusOutOfRange {
            miles,
            min: MIN_RADIUS_MILES,
            max: MAX_RADIUS_MILES,
        });
    }
    Ok(miles_to_meters(miles))
}

/// Range check for radii already stored in meters (tolerates float round-off).
pub fn validate_radius_meters(meters: f64) -> Result<(), ValidationError> {
    let miles = meters_to_miles(meters);
    let slack = 1e-9;
    if !miles.is_finite() || miles < MIN_RADIUS_MILES - slack || miles > MAX_RADIUS_MILES + slack {
        return Err(ValidationError::RadiusOutOfRange {
            miles,
            min: MIN_RADIUS_MILES,
            max: MAX_RADIUS_MILES,
        });
    }
    Ok(())
}

/// Polygon covering every point within `radius_meters` of `center`.
///
/// Buffers that would cross the antimeridian or enclose a pole are rejected
/// because the lon/lat containment test cannot represent them.
pub fn geodesic_buffer(center: LatLon, radius_meters: f64) -> Result<Polygon<f64>, ValidationError> {
    if !center.is_finite() {
        return Err(ValidationError::NonFiniteCoordinate);
    }
    if !center.in_bounds() {
        return Err(ValidationError::CoordinateOutOfBounds {
            latitude: center.latitude,
            longitude: center.longitude,
        });
    }
    validate_radius_meters(radius_meters)?;

    let origin = Point::new(center.longitude, center.latitude);
    let step = 360.0 / BUFFER_VERTICES as f64;
    let vertex_distance = radius_meters / (std::f64::consts::PI / BUFFER_VERTICES as f64).cos();

    let mut ring = Vec::with_capacity(BUFFER_VERTICES + 1);
    // Decreasing bearings give a counter-clockwise exterior ring.
    for i in 0..BUFFER_VERTICES {
        let bearing = 360.0 - step * i as f64;
        let vertex = origin.geodesic_destination(bearing, vertex_distance);

        if (vertex.x() - center.longitude).abs() > 90.0 {
            return Err(ValidationError::BufferWrapsGlobe {
                latitude: center.latitude,
                longitude: center.longitude,
            });
        }
        ring.push(Coord {
            x: vertex.x(),
            y: vertex.y(),
        });
    }
    ring.push(ring[0]);

    Ok(Polygon::new(LineString::from(ring), vec![]))
}
