//! # Auth Module
//!
//! Credential verification, bearer-token issuance, and profile management.
//! The token payload is the user's email; that email is the sole tenancy
//! key for everything in the resource layer.

pub mod crypto;
pub mod jwt;
pub mod service;
pub mod user;

pub use jwt::{Claims, JwtConfig, JwtManager};
pub use service::AuthService;
pub use user::{InMemoryUserStore, User, UserStore};
