//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    attach_resource_handler, create_area_handler, detach_resource_handler, geocode_handler, get_area_handler,
    health_handler, list_area_resources_handler, preview_area_handler, resource_areas_handler, search_areas_handler,
    search_handler, set_resource_location_handler, update_area_handler,
};

/// Upper bound on any request. Geocoding has its own shorter deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let state = AppState { deps: Arc::new(deps) };

    Router::new()
        .route("/health", get(health_handler))
        .route("/geocode", get(geocode_handler))
        .route("/search", get(search_handler))
        .route("/coverage-areas", post(create_area_handler).get(search_areas_handler))
        .route("/coverage-areas/:id", get(get_area_handler).put(update_area_handler))
        .route("/coverage-areas/:id/preview", get(preview_area_handler))
        .route(
            "/coverage-areas/:id/resources",
            post(attach_resource_handler).get(list_area_resources_handler),
        )
        .route(
            "/coverage-areas/:id/resources/:resource_id",
            delete(detach_resource_handler),
        )
        .route("/resources/:resource_id/coverage-areas", get(resource_areas_handler))
        .route("/resources/:resource_id/location", put(set_resource_location_handler))
        .layer(Extension(state))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
