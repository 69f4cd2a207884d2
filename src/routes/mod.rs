/**
 * Routes Module
 * API route handlers
 */
use serde::{Deserialize, Serialize};

pub mod auth;
pub mod blog;
pub mod health;
pub mod project;
pub mod rss;

/// Error body shared by all handlers.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}
