//! Coverage area lifecycle: create, update, read, preview.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::common::CoverageAreaId;
use crate::domains::coverage::error::CoverageError;
use crate::domains::coverage::geometry::CoveragePreview;
use crate::domains::coverage::models::{CoverageArea, CoverageAreaUpdate, CoverageKind, NewCoverageArea};
use crate::kernel::ServerDeps;

pub async fn create_coverage_area(input: NewCoverageArea, deps: &ServerDeps) -> Result<Arc<CoverageArea>, CoverageError> {
    let kind = input.kind;
    let area = CoverageArea::build(input, Utc::now()).map_err(|e| {
        debug!(kind = %kind, error = %e, "Rejected coverage area");
        e
    })?;

    let area = deps.coverage_areas.insert(area).await?;
    info!(
        id = %area.id,
        kind = %area.kind,
        name = %area.name,
        vertices = area.vertex_count(),
        "Created coverage area"
    );
    Ok(area)
}

/// Apply a partial update. Derived geometry is recomputed and the stored
/// area is replaced in one step, against whatever value is current when the
/// store takes its lock.
pub async fn update_coverage_area(
    id: CoverageAreaId,
    update: CoverageAreaUpdate,
    deps: &ServerDeps,
) -> Result<Arc<CoverageArea>, CoverageError> {
    let area = deps
        .coverage_areas
        .update(id, update, Utc::now())
        .await
        .map_err(|e| {
            if let CoverageError::Validation(err) = &e {
                debug!(id = %id, error = %err, "Rejected coverage area update");
            }
            e
        })?;
    info!(id = %area.id, name = %area.name, "Updated coverage area");
    Ok(area)
}

pub async fn get_coverage_area(id: CoverageAreaId, deps: &ServerDeps) -> Result<Arc<CoverageArea>, CoverageError> {
    deps.coverage_areas
        .get(id)
        .await?
        .ok_or(CoverageError::NotFound(id))
}

pub async fn search_coverage_areas(
    kind: Option<CoverageKind>,
    name_substring: Option<&str>,
    deps: &ServerDeps,
) -> Result<Vec<Arc<CoverageArea>>, CoverageError> {
    deps.coverage_areas.search(kind, name_substring).await
}

pub async fn coverage_area_preview(
    id: CoverageAreaId,
    tolerance: f64,
    deps: &ServerDeps,
) -> Result<CoveragePreview, CoverageError> {
    let area = get_coverage_area(id, deps).await?;
    area.preview(tolerance)
        .ok_or_else(|| CoverageError::Internal(anyhow::anyhow!("Coverage area {} has no geometry", id)))
}
