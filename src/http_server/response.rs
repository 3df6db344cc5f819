//! # Response Formatting
//!
//! Small response envelopes shared across route modules.

use serde::Serialize;

use crate::books::model::BookResponse;

/// Plain confirmation message
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Login response carrying the bearer token
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Create-book response: confirmation plus the stored record
#[derive(Debug, Clone, Serialize)]
pub struct AddBookResponse {
    pub message: String,
    pub book: BookResponse,
}
