//! Request-scoped authentication context.
//!
//! Handlers build an [`AuthContext`] once and pass it down explicitly to the
//! services that need to know who is acting.

/// Actor recorded when no user is authenticated
pub const SYSTEM_ACTOR: &str = "system";

/// Who is performing the current operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthContext {
    /// Background jobs, startup tasks and unauthenticated requests
    #[default]
    Anonymous,
    /// A logged in user
    Authenticated { username: String },
}

impl AuthContext {
    /// Context for operations the application performs on its own behalf
    pub fn system() -> Self {
        Self::Anonymous
    }

    pub fn authenticated(username: impl Into<String>) -> Self {
        Self::Authenticated {
            username: username.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Name to record as the actor of an audited operation
    pub fn actor(&self) -> &str {
        match self {
            Self::Authenticated { username } if !username.is_empty() => username,
            _ => SYSTEM_ACTOR,
        }
    }
}
