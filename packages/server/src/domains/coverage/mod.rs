//! Coverage areas: named regions, their geometry, and which resources they serve.

pub mod activities;
pub mod error;
pub mod geometry;
pub mod matcher;
pub mod models;
pub mod stores;

pub use error::{CoverageError, ValidationError};
pub use matcher::{CoverageMatch, LocationMatches, SpatialMatcher};
pub use models::{CoverageArea, CoverageAreaUpdate, CoverageKind, GeometryInput, NewCoverageArea, ResourceCoverage};
