//! # User Model and Store
//!
//! Users are documents in the `users` collection, keyed by a unique email.
//! Lookups are case-sensitive exact match. Beyond the fixed fields the
//! document carries whatever extra profile fields the frontend has saved,
//! so the model keeps them as a flattened map.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// User document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Store-generated identifier, never exposed through the API
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub username: String,

    /// Unique identity key
    pub email: String,

    /// Argon2id hash, stored under the original `password` field name
    #[serde(rename = "password")]
    pub password_hash: String,

    /// Additional profile fields, merged in by profile updates
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    /// Create a new user with an already-hashed password
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Some(ObjectId::new()),
            username,
            email,
            password_hash,
            profile: Map::new(),
        }
    }
}

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Profile as returned to the caller: the user document minus the password
/// hash and the internal identifier
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub email: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            profile: user.profile,
        }
    }
}

/// User store trait
///
/// Abstracts the document store for users. The backing store enforces the
/// unique index on email; `insert` reports a violation as
/// [`StoreError::DuplicateKey`].
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Merge already-redacted profile fields into the user's document.
    /// Returns false when no record matched the email.
    async fn merge_profile(
        &self,
        email: &str,
        fields: &Map<String, Value>,
    ) -> Result<bool, StoreError>;
}

/// In-memory user store for tests
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: std::sync::RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))?;

        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateKey);
        }

        users.push(user.clone());
        Ok(())
    }

    async fn merge_profile(
        &self,
        email: &str,
        fields: &Map<String, Value>,
    ) -> Result<bool, StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))?;

        let Some(user) = users.iter_mut().find(|u| u.email == email) else {
            return Ok(false);
        };

        for (key, value) in fields {
            // username is a fixed field on the document, everything else
            // lands in the flattened remainder
            if key == "username" {
                if let Some(name) = value.as_str() {
                    user.username = name.to_string();
                }
            } else {
                user.profile.insert(key.clone(), value.clone());
            }
        }

        Ok(true)
    }
}
