//! Point-in-polygon with inclusive boundaries.
//!
//! Coordinates are treated as planar lon/lat degrees. Areas are bounded to
//! ~100 mile radii or administrative boundaries, where the planar test agrees
//! with a spherical one well inside the buffer tolerance.

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Coord, MultiPolygon, Polygon};

use crate::common::LatLon;

/// True if the point lies inside or on the boundary of any constituent polygon.
pub fn multipolygon_contains(geom: &MultiPolygon<f64>, point: LatLon) -> bool {
    let pt = Coord {
        x: point.longitude,
        y: point.latitude,
    };
    geom.0.iter().any(|polygon| polygon_contains(polygon, pt))
}

/// Holes exclude their interior but not their boundary.
pub fn polygon_contains(polygon: &Polygon<f64>, pt: Coord<f64>) -> bool {
    match polygon.coordinate_position(&pt) {
        CoordPos::Inside | CoordPos::OnBoundary => true,
        CoordPos::Outside => false,
    }
}
