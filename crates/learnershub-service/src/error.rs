//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use learnershub_core::LmsError;
use learnershub_store::StoreError;

use crate::certificate_pdf::DocumentError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, unknown or expired session; or wrong credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Valid session but the role may not perform the operation.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - duplicate record or invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LmsError> for ApiError {
    fn from(err: LmsError) -> Self {
        let message = err.to_string();
        match err {
            LmsError::InvalidCredentials => Self::Unauthorized,
            LmsError::AccountNotFound { .. }
            | LmsError::CourseNotFound(_)
            | LmsError::NotEnrolled(_) => Self::NotFound(message),
            LmsError::EmailTaken { .. }
            | LmsError::AlreadyAssigned(_)
            | LmsError::AlreadyEnrolled(_)
            | LmsError::ModuleLocked { .. }
            | LmsError::CourseNotCompleted(_) => Self::Conflict(message),
            LmsError::RoleNotAllowed(_)
            | LmsError::WrongRole { .. }
            | LmsError::ModuleOutOfRange { .. }
            | LmsError::Validation(_)
            | LmsError::InvalidId(_) => Self::BadRequest(message),
            LmsError::PasswordHash(_) => Self::Internal(message),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            StoreError::Rule(rule) => rule.into(),
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Invalid(msg) => Self::BadRequest(msg),
            DocumentError::Render(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnershub_core::CourseId;

    #[test]
    fn rule_errors_map_to_client_statuses() {
        let cases = [
            (LmsError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                LmsError::EmailTaken {
                    email: "a@b.co".into(),
                },
                StatusCode::CONFLICT,
            ),
            (LmsError::AlreadyEnrolled(CourseId::new(1)), StatusCode::CONFLICT),
            (
                LmsError::ModuleLocked {
                    course_id: CourseId::new(1),
                    module: 2,
                },
                StatusCode::CONFLICT,
            ),
            (LmsError::CourseNotFound(CourseId::new(1)), StatusCode::NOT_FOUND),
            (LmsError::Validation("x".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            let response = ApiError::from(StoreError::Rule(err)).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn storage_failures_are_internal() {
        let response = ApiError::from(StoreError::Database("disk full".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
