//! Domain error taxonomy and the HTTP boundary translator.
//!
//! Every component raises one of the closed [`ApiError`] variants; nothing
//! below the boundary writes a response directly. The [`IntoResponse`]
//! implementation is the single place where domain failures become HTTP
//! responses. Store-level detail never leaks to the caller: unexpected
//! failures are logged and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// A single schema-level validation failure, reported as `{field, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Closed set of domain failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing/invalid/expired credential, or a cross-owner access attempt.
    #[error("{0}")]
    Unauthorized(String),

    /// Malformed input (non-boolean completion flag, bad recurrence combination).
    #[error("{0}")]
    BadRequest(String),

    /// Uniqueness violation (duplicate title per owner, duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// The resource does not exist under the caller's ownership.
    #[error("{0}")]
    NotFound(String),

    /// Field-level validation failures, reported as a list.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Unexpected/store-level failure. The detail is logged, never returned.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // Handlers pre-check uniqueness with a specific message; a
            // constraint violation surfacing here is the race backstop.
            StoreError::Duplicate(_) => ApiError::Conflict("Duplicate entry found".to_string()),
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

/// Error payload shared by every failure response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            ApiError::Validation(errors) => ("Validation failed".to_string(), Some(errors)),
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Validation(vec![]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_echoed() {
        let response = ApiError::Internal("database exploded at row 42".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
