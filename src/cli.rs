//! CLI module for booker-api
//!
//! One command: `serve`, which boots logging, configuration, the store,
//! and the HTTP server.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::auth::jwt::JwtManager;
use crate::auth::AuthService;
use crate::books::BookService;
use crate::config::AppConfig;
use crate::http_server::{AppContext, HttpServer};
use crate::storage::MongoStore;

/// booker-api - REST backend for the Booker personal book journal
#[derive(Parser, Debug)]
#[command(name = "booker-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Port to bind, overriding PORT from the environment
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors; all are fatal
#[derive(Debug, Error)]
pub enum CliError {
    #[error("boot failed: {0}")]
    Boot(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("server error: {0}")]
    Server(String),
}

/// Parse arguments and dispatch
pub fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Environment first, so RUST_LOG from .env reaches the subscriber
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Serve { port } => serve(port),
    }
}

/// Boot the store and serve until stopped
fn serve(port: Option<u16>) -> CliResult<()> {
    let mut config = AppConfig::from_env();
    if let Some(port) = port {
        config.http.port = port;
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Boot(format!("failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let store = MongoStore::connect(&config.mongodb_uri, &config.mongodb_db)
            .await
            .map_err(|e| CliError::Storage(e.to_string()))?;

        // Missing indexes cost performance, not correctness; boot anyway
        if let Err(e) = store.ensure_indexes().await {
            tracing::warn!(error = %e, "index creation failed, continuing without indexes");
        }

        let store = Arc::new(store);
        let ctx = AppContext {
            auth: AuthService::new(store.clone(), JwtManager::new(config.jwt.clone())),
            books: BookService::new(store),
        };

        HttpServer::new(config.http, ctx)
            .start()
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    })
}
