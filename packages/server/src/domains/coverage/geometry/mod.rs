//! Geometry primitives for coverage areas: parsing, validation, buffering,
//! containment and preview simplification.
//!
//! All geometry is `geo::MultiPolygon<f64>` with `x = longitude`, `y = latitude`.

pub mod bbox;
pub mod buffer;
pub mod contains;
pub mod geojson;
pub mod preview;
pub mod validate;

pub use bbox::BoundingBox;
pub use buffer::{geodesic_buffer, radius_meters_from_miles, MAX_RADIUS_MILES, MIN_RADIUS_MILES};
pub use contains::multipolygon_contains;
pub use geojson::{parse_geometry, serde_geometry, to_geojson};
pub use preview::{build_preview, CoveragePreview, DEFAULT_PREVIEW_TOLERANCE};
pub use validate::{validate_multipolygon, MAX_VERTICES};
