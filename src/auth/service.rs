//! # Auth Service
//!
//! Registration, login, token validation, and profile management on top of
//! a [`UserStore`].
//!
//! ## Invariants
//! - The email embedded in an issued token is the identity for every
//!   owner-scoped operation; nothing else grants access.
//! - Profile updates can never change email or password.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::crypto::{hash_password, verify_password};
use super::jwt::JwtManager;
use super::user::{LoginRequest, ProfileResponse, RegisterRequest, User, UserStore};
use crate::error::{ApiError, ApiResult};

/// Auth service combining credential checks and token issuance
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtManager,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtManager) -> Self {
        Self { users, jwt }
    }

    /// Register a new user
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<()> {
        if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
            return Err(ApiError::Validation("Missing fields".to_string()));
        }

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(ApiError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(request.username, request.email.clone(), password_hash);

        // A concurrent registration can still slip past the pre-check; the
        // unique index reports it as a duplicate key, which maps to the
        // same conflict.
        self.users.insert(&user).await?;

        tracing::info!(email = %request.email, "user registered");
        Ok(())
    }

    /// Authenticate a user and issue a 24-hour bearer token
    pub async fn login(&self, request: LoginRequest) -> ApiResult<String> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| ApiError::Auth("Invalid credentials".to_string()))?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(ApiError::Auth("Invalid credentials".to_string()));
        }

        self.jwt.sign(&user.email)
    }

    /// Validate a bearer token and yield the caller's identity
    pub fn authorize(&self, token: &str) -> ApiResult<String> {
        Ok(self.jwt.verify(token)?.sub)
    }

    /// Fetch the caller's profile, redacted
    pub async fn profile(&self, identity: &str) -> ApiResult<ProfileResponse> {
        let user = self
            .users
            .find_by_email(identity)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(ProfileResponse::from(user))
    }

    /// Merge profile fields into the caller's record
    ///
    /// `email`, `password`, and `_id` are stripped before the merge; they
    /// cannot be changed through this operation.
    pub async fn update_profile(
        &self,
        identity: &str,
        mut fields: Map<String, Value>,
    ) -> ApiResult<()> {
        fields.remove("email");
        fields.remove("password");
        fields.remove("_id");

        if fields.is_empty() {
            // Nothing survives redaction; just confirm the record exists
            return self.profile(identity).await.map(|_| ());
        }

        let matched = self.users.merge_profile(identity, &fields).await?;
        if !matched {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}
