use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use super::ApiResponse;
use super::validation::ValidationErrors;
use crate::db::ConflictError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    /// Per-field input errors, rendered as 422 with an `errors` map.
    Validation(ValidationErrors),

    NotImplemented(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),

    /// The account exists and the credentials are right, but the account has
    /// been blocked by an administrator.
    AccountBlocked { blocked_at: String },

    TooManyRequests(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            ApiError::Validation(_) => write!(f, "Validation failed"),
            ApiError::NotImplemented(msg) => write!(f, "Not implemented: {msg}"),
            ApiError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {msg}"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            ApiError::AccountBlocked { blocked_at } => {
                write!(f, "Account blocked at {blocked_at}")
            }
            ApiError::TooManyRequests(msg) => write!(f, "Too many requests: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let body = json!({
                    "status": "error",
                    "message": "Data yang diberikan tidak valid.",
                    "errors": errors,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            ApiError::AccountBlocked { blocked_at } => {
                let body = json!({
                    "status": "error",
                    "code": "ACCOUNT_BLOCKED",
                    "message": "Akun Anda telah diblokir. Silakan hubungi administrator.",
                    "blocked_at": blocked_at,
                });
                (StatusCode::FORBIDDEN, Json(body)).into_response()
            }
            other => {
                let (status, error_message) = match &other {
                    ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                    ApiError::DatabaseError(msg) => {
                        tracing::error!("Database error: {}", msg);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "A database error occurred".to_string(),
                        )
                    }
                    ApiError::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg.clone()),
                    ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
                    ApiError::InternalError(msg) => {
                        tracing::error!("Internal error: {}", msg);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "An internal error occurred".to_string(),
                        )
                    }
                    ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
                    ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
                    ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
                    ApiError::Validation(_) | ApiError::AccountBlocked { .. } => unreachable!(),
                };

                let body = ApiResponse::<()>::error(error_message);
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Repository errors carry a typed `ConflictError` when a business rule
/// refused the operation; everything else is an infrastructure failure.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ConflictError>() {
            Ok(conflict) => ApiError::Conflict(conflict.to_string()),
            Err(other) => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{resource} {id} not found"))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }

    pub fn not_implemented(feature: &str) -> Self {
        ApiError::NotImplemented(format!("{feature} is not yet implemented"))
    }
}
