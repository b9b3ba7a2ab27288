//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::domains::coverage::error::CoverageError;

#[derive(Debug)]
pub enum ApiError {
    Coverage(CoverageError),
    BadRequest(String),
}

impl From<CoverageError> for ApiError {
    fn from(err: CoverageError) -> Self {
        ApiError::Coverage(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Coverage(CoverageError::Validation(e)) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Coverage(e @ CoverageError::NotFound(_)) => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Coverage(e) => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CoverageAreaId;
    use crate::domains::coverage::error::ValidationError;

    #[test]
    fn status_codes() {
        let validation = ApiError::from(CoverageError::Validation(ValidationError::BlankName));
        assert_eq!(validation.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = ApiError::from(CoverageError::NotFound(CoverageAreaId::new()));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let internal = ApiError::from(CoverageError::Internal(anyhow::anyhow!("boom")));
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
