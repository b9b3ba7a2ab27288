use axum::extract::{Extension, Query};
use axum::Json;
use serde::Deserialize;

use crate::domains::geocoding::GeocodeResult;
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub q: String,
}

/// Never fails for provider problems; degraded answers are flagged `approximate`.
pub async fn geocode_handler(
    Extension(state): Extension<AppState>,
    Query(params): Query<GeocodeParams>,
) -> Json<GeocodeResult> {
    Json(state.deps.geocoder.geocode(&params.q).await)
}
