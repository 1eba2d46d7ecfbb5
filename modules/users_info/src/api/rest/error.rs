use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::rest::dto::FieldError;
use crate::domain::error::DomainError;

pub const CATEGORY_VALIDATION: &str = "Validation error";
pub const CATEGORY_BAD_REQUEST: &str = "Bad Request";
pub const CATEGORY_NOT_FOUND: &str = "Not Found";
pub const CATEGORY_INTERNAL: &str = "Internal Server Error";

/// Uniform error payload returned by every failing users endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(title = "ErrorBody")]
pub struct ErrorBody {
    /// When the failure was produced.
    pub timestamp: DateTime<Utc>,
    /// HTTP status code, repeated in the body.
    pub status_code: u16,
    /// Human-readable message. Never carries internal detail for 5xx.
    pub message: String,
    /// Failure category, e.g. "Validation error" or "Not Found".
    pub error_category: String,
    /// Path of the request that failed.
    pub request_path: String,
}

/// Axum response wrapper that renders `ErrorBody` with its status.
#[derive(Debug, Clone)]
pub struct ErrorResponse(pub ErrorBody);

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}

/// Helper to create an ErrorResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    category: &str,
    message: impl Into<String>,
    request_path: &str,
) -> ErrorResponse {
    ErrorResponse(ErrorBody {
        timestamp: Utc::now(),
        status_code: status.as_u16(),
        message: message.into(),
        error_category: category.to_string(),
        request_path: request_path.to_string(),
    })
}

/// 400 for a request that failed boundary validation.
pub fn validation_error(err: &FieldError, request_path: &str) -> ErrorResponse {
    tracing::warn!(field = err.field, reason = %err.reason, "Request validation failed");
    from_parts(
        StatusCode::BAD_REQUEST,
        CATEGORY_VALIDATION,
        err.to_string(),
        request_path,
    )
}

/// 404 for a path id that is not a UUID.
pub fn unknown_id(raw: &str, request_path: &str) -> ErrorResponse {
    tracing::warn!(id = raw, "Path id is not a UUID");
    from_parts(
        StatusCode::NOT_FOUND,
        CATEGORY_NOT_FOUND,
        format!("User not found - id: {raw}"),
        request_path,
    )
}

/// Map domain error to the uniform error body
pub fn map_domain_error(e: &DomainError, request_path: &str) -> ErrorResponse {
    match e {
        DomainError::UserNotFound { .. } => {
            tracing::warn!(error = %e, "User not found");
            from_parts(
                StatusCode::NOT_FOUND,
                CATEGORY_NOT_FOUND,
                e.to_string(),
                request_path,
            )
        }
        DomainError::EmailAlreadyExists { .. } | DomainError::IntegrityViolation { .. } => {
            tracing::warn!(error = %e, "Request rejected");
            from_parts(
                StatusCode::BAD_REQUEST,
                CATEGORY_BAD_REQUEST,
                e.to_string(),
                request_path,
            )
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, path = request_path, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                CATEGORY_INTERNAL,
                "Unexpected error",
                request_path,
            )
        }
    }
}
