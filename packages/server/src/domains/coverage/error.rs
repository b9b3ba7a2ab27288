use thiserror::Error;

use crate::common::CoverageAreaId;
use crate::domains::coverage::models::CoverageKind;

/// Reasons a coverage area write is rejected. Raised synchronously at
/// create/update time and surfaced to the caller (422 over HTTP, a row-level
/// error for import tooling).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Coverage area name must not be blank")]
    BlankName,

    #[error("Geometry has no polygons")]
    EmptyGeometry,

    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    #[error("Ring {ring} of polygon {polygon} has {positions} positions (minimum 4 once closed)")]
    RingTooShort {
        polygon: usize,
        ring: usize,
        positions: usize,
    },

    #[error("Coordinate is not a finite number")]
    NonFiniteCoordinate,

    #[error("Coordinate ({latitude}, {longitude}) is outside [-90,90] x [-180,180]")]
    CoordinateOutOfBounds { latitude: f64, longitude: f64 },

    #[error("Geometry has {count} vertices (maximum {max})")]
    TooManyVertices { count: usize, max: usize },

    #[error("Polygon {polygon} is self-intersecting")]
    SelfIntersection { polygon: usize },

    #[error("Radius of {miles} miles is outside the allowed range {min}-{max} miles")]
    RadiusOutOfRange { miles: f64, min: f64, max: f64 },

    #[error("Radius buffer around ({latitude}, {longitude}) would cross the antimeridian or cover a pole")]
    BufferWrapsGlobe { latitude: f64, longitude: f64 },

    #[error("{kind} areas require {expected}")]
    GeometryKindMismatch {
        kind: CoverageKind,
        expected: &'static str,
    },
}

/// Errors from coverage area store and matcher operations.
#[derive(Error, Debug)]
pub enum CoverageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Coverage area not found: {0}")]
    NotFound(CoverageAreaId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
