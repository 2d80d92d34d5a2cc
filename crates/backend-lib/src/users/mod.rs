// ============================
// crates/backend-lib/src/users/mod.rs
// ============================
//! User accounts: model, in-memory store and management service.

mod model;
mod service;
mod store;

pub use model::{User, DEFAULT_STRING_LENGTH, USERNAME_MAX_LENGTH};
pub use service::{NewUser, UserService, UserUpdate};
pub use store::UserStore;

use crate::auth::PasswordValidationError;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by user management operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error(transparent)]
    Password(#[from] PasswordValidationError),

    #[error("Password is required for new users")]
    PasswordRequired,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username must be between 1 and {max} characters")]
    InvalidUsername { max: usize },

    #[error("Email address has invalid format: {0}")]
    InvalidEmail(String),

    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("User {id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict { id: Uuid, expected: u32, actual: u32 },

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
