// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// API error taxonomy with appropriate status codes and client-friendly
/// messages. Internal failures are logged server-side; the client only ever
/// sees a generic message for those.
#[derive(Debug, Error)]
pub enum ApiError {
    // 401 Unauthorized
    #[error("{0}")]
    Unauthenticated(String),

    // 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 400 Bad Request - missing or malformed required fields
    #[error("{0}")]
    Validation(String),

    // 400 Bad Request - unique field collision (email, serial number)
    #[error("{0}")]
    DuplicateValue(String),

    // 404 Not Found - a referenced entity does not exist
    #[error("{0}")]
    ReferenceNotFound(String),

    // 400 Bad Request - deletion blocked by dependent records
    #[error("{0}")]
    HasDependents(String),

    // 500 Internal Server Error
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateValue(_) => StatusCode::BAD_REQUEST,
            ApiError::ReferenceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::HasDependents(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        ApiError::DuplicateValue(message.into())
    }

    pub fn reference_not_found(message: impl Into<String>) -> Self {
        ApiError::ReferenceNotFound(message.into())
    }

    pub fn has_dependents(message: impl Into<String>) -> Self {
        ApiError::HasDependents(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::not_found("Record not found"),
            other => {
                // Log the real error but never leak SQL details to clients
                tracing::error!("database error: {}", other);
                ApiError::internal("Internal server error")
            }
        }
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = match &self {
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (self.status_code(), Json(json!({ "error": message }))).into_response()
    }
}
