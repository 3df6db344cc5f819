//! # HTTP Server
//!
//! Axum router and handlers for the REST surface. Protected handlers all
//! start with [`require_identity`], the one place a bearer token becomes a
//! caller identity.

pub mod auth_routes;
pub mod book_routes;
pub mod profile_routes;
pub mod response;
pub mod server;

pub use server::{build_router, AppContext, HttpServer};

use axum::http::HeaderMap;

use crate::error::{ApiError, ApiResult};

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

/// Validate the request's bearer token and yield the caller's email
///
/// Applied at the top of every protected handler; there are no roles or
/// scopes beyond "this email's own data".
pub(crate) fn require_identity(ctx: &AppContext, headers: &HeaderMap) -> ApiResult<String> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| ApiError::Auth("Missing authorization header".to_string()))?;
    ctx.auth.authorize(token)
}
