//! Auth HTTP Routes
//!
//! Public endpoints: registration and login.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::routing::post;
use axum::Router;

use super::response::{MessageResponse, TokenResponse};
use super::server::AppContext;
use crate::auth::user::{LoginRequest, RegisterRequest};
use crate::error::{ApiError, ApiResult};

/// Public auth routes
pub fn auth_routes() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
}

/// Register handler
async fn register_handler(
    State(ctx): State<Arc<AppContext>>,
    body: Option<Json<RegisterRequest>>,
) -> ApiResult<Json<MessageResponse>> {
    let Some(Json(request)) = body else {
        return Err(ApiError::Validation("Missing fields".to_string()));
    };

    ctx.auth.register(request).await?;
    Ok(Json(MessageResponse::new("User registered successfully!")))
}

/// Login handler
async fn login_handler(
    State(ctx): State<Arc<AppContext>>,
    body: Option<Json<LoginRequest>>,
) -> ApiResult<Json<TokenResponse>> {
    let Some(Json(request)) = body else {
        // No parseable body means no credentials to check
        return Err(ApiError::Auth("Invalid credentials".to_string()));
    };

    let access_token = ctx.auth.login(request).await?;
    Ok(Json(TokenResponse { access_token }))
}
