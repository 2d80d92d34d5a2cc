use crate::auth::{AuthService, LoginFailure, PasswordEncoder};
use crate::users::{User, UserStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};
use zeroize::Zeroize;

/// Plain text behind the stand-in hash; it never authenticates anyone
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-users";

/// Authenticates against the in-memory user store
pub struct DefaultAuth {
    users: Arc<UserStore>,
    encoder: PasswordEncoder,
    /// Verified in place of a real hash so unknown users cost the same scrypt work
    dummy_hash: String,
}

impl DefaultAuth {
    pub fn new(users: Arc<UserStore>, encoder: PasswordEncoder) -> anyhow::Result<Self> {
        let dummy_hash = encoder.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            users,
            encoder,
            dummy_hash,
        })
    }

    /// Hash to check the password against, plus the user it belongs to
    fn credential_hash(&self, username: &str) -> (String, Option<User>) {
        match self.users.find_by_username(username) {
            Some(user) => match user.password_hash.clone() {
                Some(hash) => (hash, Some(user)),
                None => (self.dummy_hash.clone(), None),
            },
            None => (self.dummy_hash.clone(), None),
        }
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, LoginFailure> {
        let (hash, user) = self.credential_hash(username);

        // scrypt is CPU bound; keep it off the async workers
        let encoder = self.encoder.clone();
        let mut plain = password.to_string();
        let verified = tokio::task::spawn_blocking(move || {
            let ok = encoder.verify(&hash, &plain);
            plain.zeroize();
            ok
        })
        .await
        .map_err(|e| {
            error!("Password verification task failed: {e}");
            LoginFailure::Unknown
        })?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                debug!(username, "Invalid credentials");
                return Err(LoginFailure::InvalidCredentials);
            },
        };
        if !user.is_enabled() {
            return Err(LoginFailure::AccountDisabled);
        }
        Ok(user)
    }
}
