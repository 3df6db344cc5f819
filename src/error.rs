//! # API Errors
//!
//! Error taxonomy for the whole service, mapped to HTTP status codes.
//!
//! ## Invariants
//! - A missing book and a book owned by someone else are the same error,
//!   so other users cannot probe for existence.
//! - Credential errors never say whether the email or the password was wrong.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Service-wide errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or missing/invalid/expired token
    #[error("{0}")]
    Auth(String),

    /// Resource missing or not owned by the caller (indistinguishable)
    #[error("{0}")]
    Forbidden(String),

    /// Duplicate unique key
    #[error("{0}")]
    Conflict(String),

    /// Backing record gone despite a valid credential
    #[error("{0}")]
    NotFound(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Storage failure
    #[error("Storage error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    ///
    /// Duplicate-key conflicts map to 400, not 409: the frontend treats
    /// every rejection of a registration form the same way.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if !self.is_client_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

/// Errors surfaced by the storage seam
///
/// The document store is an external collaborator; everything it reports
/// collapses into either a unique-key violation or a backend failure.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Unique index violation
    #[error("duplicate key")]
    DuplicateKey,

    /// Any other storage failure
    #[error("{0}")]
    Backend(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // The only unique index in the system is users.email
            StoreError::DuplicateKey => ApiError::Conflict("User already exists".to_string()),
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::Validation("Missing fields".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("User already exists".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Auth("Invalid credentials".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("Book not found or unauthorized".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("User not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_duplicate_key_becomes_conflict() {
        let err: ApiError = StoreError::DuplicateKey.into();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.to_string(), "User already exists");
    }

    #[test]
    fn test_credential_error_does_not_leak_which_field_was_wrong() {
        let err = ApiError::Auth("Invalid credentials".to_string());
        assert!(!err.to_string().contains("password"));
        assert!(!err.to_string().contains("email"));
    }
}
