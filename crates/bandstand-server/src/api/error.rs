//! Error-to-HTTP mapping for every handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use bandstand_db::StoreError;

/// The JSON error view rendered on every failure path.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Detail routes for an absent id render the 404 view
    NotFound(String),
    /// Expected validation/constraint failures: user-facing message, no 500
    Unprocessable(String),
    /// Unexpected store failure: generic view, detail stays in the log
    Internal,
}

impl ApiError {
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        ApiError::Unprocessable(msg.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("record not found".to_string()),
            StoreError::Validation(msg) => ApiError::Unprocessable(msg),
            StoreError::Constraint(detail) => {
                tracing::warn!("constraint violation: {detail}");
                ApiError::Unprocessable(
                    "the submitted record conflicts with existing data \
                     (check that referenced artist and venue ids exist)"
                        .to_string(),
                )
            }
            StoreError::Store(db_err) => {
                tracing::error!("store failure: {db_err}");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable", msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "an unexpected error occurred".to_string(),
            ),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = StoreError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_validation_maps_to_unprocessable_with_message() {
        let err: ApiError = StoreError::validation("name is required").into();
        match err {
            ApiError::Unprocessable(msg) => assert_eq!(msg, "name is required"),
            other => panic!("expected Unprocessable, got {other:?}"),
        }
    }

    #[test]
    fn test_constraint_maps_to_unprocessable_without_detail() {
        let err: ApiError = StoreError::Constraint("fk_shows_artist_id".into()).into();
        match err {
            // The raw constraint name never reaches the client
            ApiError::Unprocessable(msg) => assert!(!msg.contains("fk_shows_artist_id")),
            other => panic!("expected Unprocessable, got {other:?}"),
        }
    }

    #[test]
    fn test_store_failure_maps_to_internal() {
        let err: ApiError = StoreError::Store(bandstand_db::sea_orm::DbErr::Custom("boom".into())).into();
        assert!(matches!(err, ApiError::Internal));
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody {
            error: "not_found",
            message: "record not found".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["message"], "record not found");
    }
}
