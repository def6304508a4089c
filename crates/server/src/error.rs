//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Application errors.
///
/// Every variant maps to a fixed HTTP status and a JSON body. Validation
/// errors are raised before any mutation is attempted; none of these are
/// fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed identifier or a field failing validation.
    #[error("{0}")]
    BadRequest(String),

    /// Well-formed identifier with no matching record.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate name or a delete blocked by dependent records.
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role.
    #[error("{0}")]
    Forbidden(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            AppError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "message": message }))).into_response()
            }
            AppError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
            }
            AppError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(json!({ "message": message }))).into_response()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "server error", "error": e.to_string() })),
                )
                    .into_response()
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "server error", "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (
                AppError::BadRequest("bad".into()).into_response(),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotFound("missing".into()).into_response(),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Conflict("dup".into()).into_response(),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Unauthorized("no token".into()).into_response(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Forbidden("no role".into()).into_response(),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")).into_response(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (response, expected) in cases {
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn message_passthrough() {
        let err = AppError::NotFound("product not found".into());
        assert_eq!(err.to_string(), "product not found");
    }
}
