//! Error types for quotebox-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quotebox_common::{Error as CommonError, ValidationErrors};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Staff only (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Submission rejected (422)
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// quotebox-common error
    #[error("Common error: {0}")]
    Common(#[from] CommonError),
}

impl ApiError {
    /// Status code, error code and message for this error
    fn parts(self) -> (StatusCode, &'static str, String, Option<ValidationErrors>) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg, None),
            ApiError::Validation(errors) => validation_parts(errors),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, None)
            }
            ApiError::Common(err) => match err {
                CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
                CommonError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None)
                }
                CommonError::Validation(errors) => validation_parts(errors),
                other => {
                    error!("Request failed: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "COMMON_ERROR",
                        other.to_string(),
                        None,
                    )
                }
            },
        }
    }
}

fn validation_parts(
    errors: ValidationErrors,
) -> (StatusCode, &'static str, String, Option<ValidationErrors>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        "VALIDATION_FAILED",
        errors.to_string(),
        Some(errors),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, fields) = self.parts();

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(fields) = fields {
            error["fields"] = json!(fields
                .iter()
                .map(|(field, err)| json!({ "field": field, "message": err.to_string() }))
                .collect::<Vec<_>>());
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
