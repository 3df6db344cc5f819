//! # Application Configuration
//!
//! Environment-driven configuration, with defaults that bring the service
//! up against a local MongoDB. A `.env` file is honored when present.

use serde::{Deserialize, Serialize};

use crate::auth::jwt::JwtConfig;

/// HTTP binding and CORS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty means permissive (development)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl HttpServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http: HttpServerConfig,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub jwt: JwtConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            mongodb_uri: "mongodb://localhost:27017/".to_string(),
            mongodb_db: "booker".to_string(),
            jwt: JwtConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the environment
    ///
    /// Recognized variables: `MONGODB_URI`, `MONGODB_DB`, `JWT_SECRET`,
    /// `HOST`, `PORT`, `CORS_ORIGINS` (comma-separated). Anything unset
    /// falls back to the defaults above.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(uri) = std::env::var("MONGODB_URI") {
            config.mongodb_uri = uri;
        }
        if let Ok(db) = std::env::var("MONGODB_DB") {
            config.mongodb_db = db;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.jwt.secret = secret;
        }
        if let Ok(host) = std::env::var("HOST") {
            config.http.host = host;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.http.port = port;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.http.cors_origins = parse_origins(&origins);
        }

        config
    }
}

/// Split a comma-separated origin list, dropping empty entries
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
