use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;

use crate::common::{LatLon, ResourceId};
use crate::domains::coverage::activities::list_areas_for_resource;
use crate::domains::coverage::error::{CoverageError, ValidationError};
use crate::domains::coverage::models::CoverageArea;
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub async fn resource_areas_handler(
    Extension(state): Extension<AppState>,
    Path(resource_id): Path<ResourceId>,
) -> Result<Json<Vec<CoverageArea>>, ApiError> {
    let areas = list_areas_for_resource(resource_id, &state.deps).await?;
    Ok(Json(areas.iter().map(|a| CoverageArea::clone(a)).collect()))
}

pub async fn set_resource_location_handler(
    Extension(state): Extension<AppState>,
    Path(resource_id): Path<ResourceId>,
    Json(location): Json<LatLon>,
) -> Result<StatusCode, ApiError> {
    if !location.is_finite() {
        return Err(CoverageError::Validation(ValidationError::NonFiniteCoordinate).into());
    }
    if !location.in_bounds() {
        return Err(CoverageError::Validation(ValidationError::CoordinateOutOfBounds {
            latitude: location.latitude,
            longitude: location.longitude,
        })
        .into());
    }

    state
        .deps
        .resource_locator
        .set_location(resource_id, location)
        .await
        .map_err(CoverageError::Internal)?;
    Ok(StatusCode::NO_CONTENT)
}
