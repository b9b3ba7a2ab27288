use axum::extract::{Extension, Query};
use axum::Json;
use serde::Deserialize;

use crate::common::LatLon;
use crate::domains::search::{find_resources_by_location, LocationQuery, SearchOutcome};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_miles: Option<f64>,
}

impl SearchParams {
    /// Coordinates win over text when both are given.
    fn location_query(self) -> Result<LocationQuery, ApiError> {
        match (self.lat, self.lon, self.q) {
            (Some(lat), Some(lon), _) => Ok(LocationQuery::Coordinates(LatLon::new(lat, lon))),
            (None, None, Some(q)) => Ok(LocationQuery::Text(q)),
            (Some(_), None, _) | (None, Some(_), _) => {
                Err(ApiError::BadRequest("lat and lon must be given together".to_string()))
            }
            (None, None, None) => Err(ApiError::BadRequest("either q or lat/lon is required".to_string())),
        }
    }
}

pub async fn search_handler(
    Extension(state): Extension<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let radius_miles = params.radius_miles;
    let query = params.location_query()?;
    let outcome = find_resources_by_location(query, radius_miles, &state.deps).await?;
    Ok(Json(outcome))
}
