// ================
// common/src/lib.rs
// ================
//! Common types shared between the backend and its HTTP clients.
//! This module defines the JSON bodies of the login and health endpoints.

use serde::{Deserialize, Serialize};

/// Identifier of a stored user
pub type UserId = uuid::Uuid;

/// Body of `POST /api/login`
#[derive(Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    /// Account name
    pub username: String,
    /// Plain text password, never logged
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response to a successful login
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// ID of the authenticated user
    pub user_id: UserId,
    /// Account name
    pub username: String,
    /// Human readable name, e.g. `"Jane Doe [jane]"`
    pub display_name: String,
}

/// Response of `GET /health`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Error envelope returned by every failing endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Machine readable code plus a message safe to show to users
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
