use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::domains::geocoding::{BreakerSnapshot, CacheStats};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    store: StoreHealth,
    geocoder: GeocoderHealth,
}

#[derive(Serialize)]
pub struct StoreHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct GeocoderHealth {
    providers: Vec<String>,
    breaker: BreakerSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache: Option<CacheStats>,
}

/// Health check endpoint
///
/// Checks coverage store reachability and reports the geocoder's breaker
/// state and cache statistics. An open breaker is reported but does not make
/// the service unhealthy, since geocoding degrades to name matching.
///
/// Returns 200 OK when the store is reachable, 503 Service Unavailable otherwise.
pub async fn health_handler(Extension(state): Extension<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let deps = &state.deps;

    let store = match tokio::time::timeout(Duration::from_secs(5), deps.coverage_areas.health_check()).await {
        Ok(Ok(())) => StoreHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => StoreHealth {
            status: "error".to_string(),
            error: Some(format!("Store check failed: {}", e)),
        },
        Err(_) => StoreHealth {
            status: "error".to_string(),
            error: Some("Store check timeout (>5s)".to_string()),
        },
    };

    let geocoder = GeocoderHealth {
        providers: deps.geocoder.provider_names(),
        breaker: deps.geocoder.breaker_snapshot(),
        cache: deps.geocoder.cache_stats().await.ok(),
    };

    let is_healthy = store.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            store,
            geocoder,
        }),
    )
}
