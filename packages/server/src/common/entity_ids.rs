//! Typed ID definitions for the coverage domain.
//!
//! ```rust
//! use coverage_core::common::{CoverageAreaId, ResourceId};
//!
//! let area: CoverageAreaId = CoverageAreaId::new();
//! let resource: ResourceId = ResourceId::new();
//! // let wrong: ResourceId = area; // compile error
//! # let _ = (area, resource);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker for named geographic regions.
pub struct CoverageArea;

/// Marker for service resources (shelters, pantries, clinics). Resources
/// themselves live outside this crate; only their ids cross the boundary.
pub struct Resource;

/// Marker for resource ↔ coverage area links.
pub struct ResourceCoverage;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type CoverageAreaId = Id<CoverageArea>;

pub type ResourceId = Id<Resource>;

pub type ResourceCoverageId = Id<ResourceCoverage>;
