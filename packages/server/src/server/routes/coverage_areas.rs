use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::{CoverageAreaId, ResourceId};
use crate::domains::coverage::activities::{
    attach_resource_to_coverage_area, coverage_area_preview, create_coverage_area, detach_resource_from_coverage_area,
    get_coverage_area, list_resources_for_area, search_coverage_areas, update_coverage_area,
};
use crate::domains::coverage::geometry::{CoveragePreview, DEFAULT_PREVIEW_TOLERANCE};
use crate::domains::coverage::models::{CoverageArea, CoverageAreaUpdate, CoverageKind, NewCoverageArea, ResourceCoverage};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AreaSearchParams {
    pub kind: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub tolerance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AttachRequest {
    pub resource_id: ResourceId,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetachResponse {
    pub removed: bool,
}

pub async fn create_area_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<NewCoverageArea>,
) -> Result<(StatusCode, Json<CoverageArea>), ApiError> {
    let area = create_coverage_area(input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(CoverageArea::clone(&area))))
}

pub async fn search_areas_handler(
    Extension(state): Extension<AppState>,
    Query(params): Query<AreaSearchParams>,
) -> Result<Json<Vec<CoverageArea>>, ApiError> {
    let kind = params
        .kind
        .as_deref()
        .map(str::parse::<CoverageKind>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let areas = search_coverage_areas(kind, params.name.as_deref(), &state.deps).await?;
    Ok(Json(areas.iter().map(|a| CoverageArea::clone(a)).collect()))
}

pub async fn get_area_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<CoverageAreaId>,
) -> Result<Json<CoverageArea>, ApiError> {
    let area = get_coverage_area(id, &state.deps).await?;
    Ok(Json(CoverageArea::clone(&area)))
}

pub async fn update_area_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<CoverageAreaId>,
    Json(update): Json<CoverageAreaUpdate>,
) -> Result<Json<CoverageArea>, ApiError> {
    let area = update_coverage_area(id, update, &state.deps).await?;
    Ok(Json(CoverageArea::clone(&area)))
}

pub async fn preview_area_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<CoverageAreaId>,
    Query(params): Query<PreviewParams>,
) -> Result<Json<CoveragePreview>, ApiError> {
    let tolerance = match params.tolerance {
        Some(t) if !t.is_finite() || t < 0.0 => {
            return Err(ApiError::BadRequest("tolerance must be a non-negative number".to_string()))
        }
        Some(t) => t,
        None => DEFAULT_PREVIEW_TOLERANCE,
    };
    Ok(Json(coverage_area_preview(id, tolerance, &state.deps).await?))
}

pub async fn attach_resource_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<CoverageAreaId>,
    Json(request): Json<AttachRequest>,
) -> Result<(StatusCode, Json<ResourceCoverage>), ApiError> {
    let link = attach_resource_to_coverage_area(
        request.resource_id,
        id,
        request.notes,
        request.created_by,
        &state.deps,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn list_area_resources_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<CoverageAreaId>,
) -> Result<Json<Vec<ResourceCoverage>>, ApiError> {
    Ok(Json(list_resources_for_area(id, &state.deps).await?))
}

pub async fn detach_resource_handler(
    Extension(state): Extension<AppState>,
    Path((id, resource_id)): Path<(CoverageAreaId, ResourceId)>,
) -> Result<Json<DetachResponse>, ApiError> {
    let removed = detach_resource_from_coverage_area(resource_id, id, &state.deps).await?;
    Ok(Json(DetachResponse { removed }))
}
