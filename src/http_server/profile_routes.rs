//! Profile HTTP Routes
//!
//! The caller's own user record: fetch (redacted) and merge-update.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use serde_json::{Map, Value};

use super::require_identity;
use super::response::MessageResponse;
use super::server::AppContext;
use crate::auth::user::ProfileResponse;
use crate::error::{ApiError, ApiResult};

/// Profile routes
pub fn profile_routes() -> Router<Arc<AppContext>> {
    Router::new().route(
        "/profile",
        get(get_profile_handler).put(update_profile_handler),
    )
}

/// Fetch the caller's profile
async fn get_profile_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> ApiResult<Json<ProfileResponse>> {
    let identity = require_identity(&ctx, &headers)?;
    Ok(Json(ctx.auth.profile(&identity).await?))
}

/// Merge fields into the caller's profile
async fn update_profile_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Option<Json<Map<String, Value>>>,
) -> ApiResult<Json<MessageResponse>> {
    let identity = require_identity(&ctx, &headers)?;

    let fields = match body {
        Some(Json(fields)) if !fields.is_empty() => fields,
        _ => return Err(ApiError::Validation("No data provided".to_string())),
    };

    ctx.auth.update_profile(&identity, fields).await?;
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}
