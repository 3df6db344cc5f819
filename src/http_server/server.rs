//! # HTTP Server
//!
//! Application context, router assembly, and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth_routes::auth_routes;
use super::book_routes::book_routes;
use super::profile_routes::profile_routes;
use crate::auth::AuthService;
use crate::books::BookService;
use crate::config::HttpServerConfig;
use crate::error::ApiError;

/// Application context: every store handle and service the handlers need,
/// constructed once at startup and passed to every request. There is no
/// other process-wide state.
pub struct AppContext {
    pub auth: AuthService,
    pub books: BookService,
}

/// Build the full router against a context
///
/// Exposed separately from [`HttpServer`] so tests can drive the router
/// directly.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(auth_routes())
        .merge(profile_routes())
        .merge(book_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Liveness probe
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// HTTP server for the Booker API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server from a config and an application context
    pub fn new(config: HttpServerConfig, ctx: AppContext) -> Self {
        let cors = Self::cors_layer(&config);
        let router = build_router(Arc::new(ctx)).layer(cors);
        Self { config, router }
    }

    /// Configure CORS: permissive when no origins are configured
    /// (development), an explicit allow-list otherwise
    fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
        if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> Result<(), ApiError> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| ApiError::Internal(format!("invalid socket address: {}", e)))?;

        tracing::info!(%addr, "booker-api listening");

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::Internal(format!("bind failed: {}", e)))?;
        axum::serve(listener, self.router)
            .await
            .map_err(|e| ApiError::Internal(format!("server failed: {}", e)))?;

        Ok(())
    }
}
