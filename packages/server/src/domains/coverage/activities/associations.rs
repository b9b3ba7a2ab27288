//! Resource to coverage area links.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::common::{CoverageAreaId, ResourceId};
use crate::domains::coverage::activities::get_coverage_area;
use crate::domains::coverage::error::CoverageError;
use crate::domains::coverage::models::{CoverageArea, ResourceCoverage};
use crate::kernel::ServerDeps;

/// Link a resource to an area. Attaching the same pair again updates the
/// notes and returns the existing link.
pub async fn attach_resource_to_coverage_area(
    resource_id: ResourceId,
    coverage_area_id: CoverageAreaId,
    notes: Option<String>,
    created_by: Option<String>,
    deps: &ServerDeps,
) -> Result<ResourceCoverage, CoverageError> {
    get_coverage_area(coverage_area_id, deps).await?;

    let link = ResourceCoverage::new(resource_id, coverage_area_id, notes, created_by, Utc::now());
    let link = deps.resource_coverages.attach(link).await?;
    info!(resource_id = %resource_id, coverage_area_id = %coverage_area_id, "Attached resource to coverage area");
    Ok(link)
}

/// Returns true if a link existed.
pub async fn detach_resource_from_coverage_area(
    resource_id: ResourceId,
    coverage_area_id: CoverageAreaId,
    deps: &ServerDeps,
) -> Result<bool, CoverageError> {
    let removed = deps.resource_coverages.detach(resource_id, coverage_area_id).await?;
    if removed {
        info!(resource_id = %resource_id, coverage_area_id = %coverage_area_id, "Detached resource from coverage area");
    }
    Ok(removed)
}

pub async fn list_areas_for_resource(
    resource_id: ResourceId,
    deps: &ServerDeps,
) -> Result<Vec<Arc<CoverageArea>>, CoverageError> {
    let links = deps.resource_coverages.for_resource(resource_id).await?;
    let mut areas = Vec::with_capacity(links.len());
    for link in links {
        if let Some(area) = deps.coverage_areas.get(link.coverage_area_id).await? {
            areas.push(area);
        }
    }
    Ok(areas)
}

pub async fn list_resources_for_area(
    coverage_area_id: CoverageAreaId,
    deps: &ServerDeps,
) -> Result<Vec<ResourceCoverage>, CoverageError> {
    get_coverage_area(coverage_area_id, deps).await?;
    Ok(deps.resource_coverages.for_areas(&[coverage_area_id]).await?)
}
