//! Test fixtures for creating coverage areas and resources.
//!
//! Coordinates are around Laurel County, Kentucky.

use std::sync::Arc;

use coverage_core::common::{LatLon, ResourceId};
use coverage_core::domains::coverage::activities::{attach_resource_to_coverage_area, create_coverage_area};
use coverage_core::domains::coverage::models::{CoverageArea, CoverageKind, GeometryInput, NewCoverageArea};
use coverage_core::kernel::ServerDeps;
use serde_json::{json, Value};

pub const LONDON_KY: LatLon = LatLon {
    latitude: 37.1283,
    longitude: -84.0836,
};

pub const CORBIN_KY: LatLon = LatLon {
    latitude: 36.9487,
    longitude: -84.0969,
};

pub const LOUISVILLE_KY: LatLon = LatLon {
    latitude: 38.2527,
    longitude: -85.7585,
};

/// Axis-aligned rectangle as a GeoJSON Polygon.
pub fn rectangle(west: f64, south: f64, east: f64, north: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[west, south], [east, south], [east, north], [west, north], [west, south]]]
    })
}

/// Rough Kentucky outline
pub fn kentucky() -> Value {
    rectangle(-89.6, 36.5, -81.9, 39.1)
}

/// Rough Laurel County outline (London is inside, Corbin is on the southern edge)
pub fn laurel_county() -> Value {
    rectangle(-84.35, 36.94, -83.85, 37.32)
}

pub fn radius_input(name: &str, center: LatLon, miles: f64) -> NewCoverageArea {
    NewCoverageArea::builder()
        .kind(CoverageKind::Radius)
        .name(name)
        .geometry(GeometryInput::CenterRadius {
            center,
            radius_miles: miles,
        })
        .build()
}

pub fn polygon_input(kind: CoverageKind, name: &str, geometry: Value) -> NewCoverageArea {
    NewCoverageArea::builder()
        .kind(kind)
        .name(name)
        .geometry(GeometryInput::GeoJson(geometry))
        .build()
}

pub async fn create_area(deps: &ServerDeps, input: NewCoverageArea) -> Arc<CoverageArea> {
    create_coverage_area(input, deps)
        .await
        .expect("Failed to create coverage area")
}

/// New resource attached to every given area.
pub async fn resource_serving(deps: &ServerDeps, areas: &[&Arc<CoverageArea>]) -> ResourceId {
    let resource = ResourceId::new();
    for area in areas {
        attach_resource_to_coverage_area(resource, area.id, None, Some("fixtures".to_string()), deps)
            .await
            .expect("Failed to attach resource");
    }
    resource
}
