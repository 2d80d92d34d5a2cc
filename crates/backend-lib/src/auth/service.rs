use crate::users::User;
use async_trait::async_trait;
use thiserror::Error;

/// Why a login attempt was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account disabled")]
    AccountDisabled,

    #[error("unknown error")]
    Unknown,
}

impl LoginFailure {
    /// Reason string recorded in the audit trail
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid credentials",
            Self::AccountDisabled => "account disabled",
            Self::Unknown => "unknown error",
        }
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check a username and password, returning the matching active user
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, LoginFailure>;
}
