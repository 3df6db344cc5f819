//! booker-api - REST backend for the Booker personal book journal
//!
//! Two layers: an auth layer that verifies credentials and issues bearer
//! tokens, and a resource layer that performs owner-scoped CRUD over the
//! `users` and `books` collections.

pub mod auth;
pub mod books;
pub mod cli;
pub mod config;
pub mod error;
pub mod http_server;
pub mod storage;
