use geo::{LineString, MultiPolygon, Polygon, Simplify};
use serde::Serialize;
use serde_json::Value;

use super::bbox::BoundingBox;
use super::geojson::to_geojson;

/// Douglas-Peucker tolerance in degrees (~100 m at the equator).
pub const DEFAULT_PREVIEW_TOLERANCE: f64 = 0.001;

/// Lightweight geometry for map previews.
#[derive(Debug, Clone, Serialize)]
pub struct CoveragePreview {
    pub geometry: Value,
    pub bbox: BoundingBox,
}

pub fn build_preview(geom: &MultiPolygon<f64>, tolerance: f64) -> Option<CoveragePreview> {
    let bbox = BoundingBox::of(geom)?;
    let simplified = MultiPolygon::new(
        geom.0
            .iter()
            .map(|polygon| simplify_polygon(polygon, tolerance))
            .collect(),
    );
    Some(CoveragePreview {
        geometry: to_geojson(&simplified),
        bbox,
    })
}

fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    let exterior = simplify_ring(polygon.exterior(), tolerance);
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| simplify_ring(ring, tolerance))
        .collect();
    Polygon::new(exterior, interiors)
}

// A ring that collapses below four positions keeps its original shape.
fn simplify_ring(ring: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    let simplified = ring.simplify(&tolerance);
    if simplified.0.len() < 4 {
        ring.clone()
    } else {
        simplified
    }
}
