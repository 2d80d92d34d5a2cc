//! User entity.
use super::UserError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

pub const USERNAME_MAX_LENGTH: usize = 100;
pub const DEFAULT_STRING_LENGTH: usize = 255;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

/// Application user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Optimistic locking counter, bumped by every save
    pub version: u32,
    pub username: String,
    /// scrypt PHC string
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub time_zone_id: Option<String>,
}

impl User {
    /// A fresh, active, unsaved user
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: 0,
            username: username.into(),
            password_hash: None,
            first_name: None,
            last_name: None,
            email: None,
            active: true,
            time_zone_id: None,
        }
    }

    /// `"First Last [username]"`, with missing names left out
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{first} {last} [{}]", self.username).trim().to_string()
    }

    pub fn is_enabled(&self) -> bool {
        self.active
    }

    /// Check field constraints
    pub fn validate(&self) -> Result<(), UserError> {
        let username_len = self.username.chars().count();
        if username_len == 0 || username_len > USERNAME_MAX_LENGTH || self.username.trim().is_empty() {
            return Err(UserError::InvalidUsername {
                max: USERNAME_MAX_LENGTH,
            });
        }

        for (field, value) in [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("timeZoneId", &self.time_zone_id),
        ] {
            if value.as_deref().is_some_and(|v| v.chars().count() > DEFAULT_STRING_LENGTH) {
                return Err(UserError::FieldTooLong {
                    field,
                    max: DEFAULT_STRING_LENGTH,
                });
            }
        }

        if let Some(email) = &self.email {
            if !EMAIL_REGEX.is_match(email) {
                return Err(UserError::InvalidEmail(email.clone()));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("username", &self.username)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<redacted>"))
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}
