// ============================
// crates/backend-lib/src/users/service.rs
// ============================
//! User management operations.
//!
//! Every path that stores a password goes through
//! [`UserService::prepare_user_for_save`], which applies the password policy
//! before encoding.
use super::{User, UserError, UserStore};
use crate::audit::AuditLogger;
use crate::auth::{AuthContext, PasswordEncoder, PasswordPolicy};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Input for creating a user
#[derive(Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    /// Checked against `password` when present
    pub confirm_password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub time_zone_id: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }
}

/// Full replacement of a user's editable fields
#[derive(Clone, Default)]
pub struct UserUpdate {
    /// Version the edit was based on
    pub version: u32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub time_zone_id: Option<String>,
    pub active: bool,
    /// New password; `None` or empty keeps the current one
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl UserUpdate {
    /// Start an edit from the current state of `user`
    pub fn from_user(user: &User) -> Self {
        Self {
            version: user.version,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            time_zone_id: user.time_zone_id.clone(),
            active: user.active,
            password: None,
            confirm_password: None,
        }
    }
}

/// Service for user management operations
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<UserStore>,
    encoder: PasswordEncoder,
    policy: PasswordPolicy,
    audit: Arc<AuditLogger>,
}

impl UserService {
    pub fn new(
        store: Arc<UserStore>,
        encoder: PasswordEncoder,
        policy: PasswordPolicy,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            store,
            encoder,
            policy,
            audit,
        }
    }

    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Encode a plain text password
    pub fn encode_password(&self, password: &str) -> Result<String, UserError> {
        debug!("Encoding password for user");
        self.encoder
            .hash(password)
            .map_err(|e| UserError::Hashing(e.to_string()))
    }

    /// Check that a password and its confirmation are identical
    pub fn validate_password_confirmation(&self, password: &str, confirm_password: &str) -> bool {
        let matches = password == confirm_password;
        if !matches {
            warn!("Password confirmation validation failed");
        }
        matches
    }

    /// Apply the password policy
    pub fn validate_password_strength(&self, password: &str) -> Result<(), UserError> {
        self.policy.validate(Some(password))?;
        Ok(())
    }

    /// Validate and encode `password` onto `user` before it is saved.
    ///
    /// New users must supply a password. Existing users keep their current
    /// hash when `password` is `None` or empty. Returns whether a new hash
    /// was set.
    pub fn prepare_user_for_save(
        &self,
        user: &mut User,
        password: Option<&str>,
        is_new: bool,
    ) -> Result<bool, UserError> {
        let password = password.filter(|p| !p.is_empty());

        if is_new {
            let password = password.ok_or(UserError::PasswordRequired)?;
            self.encode_and_set_password(user, password)?;
            info!(username = %user.username, "Prepared new user for save");
            return Ok(true);
        }

        match password {
            Some(password) => {
                self.encode_and_set_password(user, password)?;
                info!(id = %user.id, username = %user.username, "Prepared user password update");
                Ok(true)
            }
            None => {
                debug!(id = %user.id, username = %user.username, "Prepared user for update (no password change)");
                Ok(false)
            }
        }
    }

    /// Create and store a user
    pub fn create_user(&self, ctx: &AuthContext, new_user: NewUser) -> Result<User, UserError> {
        if let Some(confirm) = &new_user.confirm_password {
            if !self.validate_password_confirmation(&new_user.password, confirm) {
                return Err(UserError::PasswordMismatch);
            }
        }

        let mut user = User::new(new_user.username);
        user.first_name = new_user.first_name;
        user.last_name = new_user.last_name;
        user.email = new_user.email;
        user.time_zone_id = new_user.time_zone_id;
        user.validate()?;

        // Skip the hashing cost for names that are already taken
        if self.store.find_by_username(&user.username).is_some() {
            return Err(UserError::DuplicateUsername(user.username));
        }

        self.prepare_user_for_save(&mut user, Some(&new_user.password), true)?;
        let user = self.store.insert(user)?;

        self.audit.log_user_created(ctx, user.id, &user.username);
        Ok(user)
    }

    /// Save edited profile fields and, optionally, a new password
    pub fn update_user(&self, ctx: &AuthContext, id: Uuid, update: UserUpdate) -> Result<User, UserError> {
        let mut user = self.store.get(id).ok_or(UserError::NotFound(id))?;

        if let (Some(password), Some(confirm)) = (&update.password, &update.confirm_password) {
            if !self.validate_password_confirmation(password, confirm) {
                return Err(UserError::PasswordMismatch);
            }
        }

        user.version = update.version;
        user.first_name = update.first_name;
        user.last_name = update.last_name;
        user.email = update.email;
        user.time_zone_id = update.time_zone_id;
        user.active = update.active;
        user.validate()?;

        let password_changed =
            self.prepare_user_for_save(&mut user, update.password.as_deref(), false)?;
        let user = self.store.update(user)?;

        self.audit.log_user_updated(ctx, user.id, &user.username);
        if password_changed {
            self.audit.log_password_changed(ctx, user.id, &user.username);
        }
        Ok(user)
    }

    /// Replace a user's password
    pub fn change_password(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, UserError> {
        if !self.validate_password_confirmation(password, confirm_password) {
            return Err(UserError::PasswordMismatch);
        }

        let mut user = self.store.get(id).ok_or(UserError::NotFound(id))?;
        self.encode_and_set_password(&mut user, password)?;
        let user = self.store.update(user)?;

        info!(id = %user.id, username = %user.username, "Password changed");
        self.audit.log_password_changed(ctx, user.id, &user.username);
        Ok(user)
    }

    pub fn delete_user(&self, ctx: &AuthContext, id: Uuid) -> Result<User, UserError> {
        let user = self.store.remove(id)?;
        info!(id = %user.id, username = %user.username, "User deleted");
        self.audit.log_user_deleted(ctx, user.id, &user.username);
        Ok(user)
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.store.get(id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        self.store.find_by_username(username)
    }

    /// Create the initial administrator unless the username already exists
    pub fn ensure_user(&self, username: &str, password: &str) -> Result<Option<User>, UserError> {
        if self.store.find_by_username(username).is_some() {
            debug!(username, "Bootstrap user already present");
            return Ok(None);
        }

        let user = self.create_user(&AuthContext::system(), NewUser::new(username, password))?;
        info!(username = %user.username, "Bootstrap user created");
        Ok(Some(user))
    }

    fn encode_and_set_password(&self, user: &mut User, password: &str) -> Result<(), UserError> {
        self.validate_password_strength(password)?;
        user.password_hash = Some(self.encode_password(password)?);
        Ok(())
    }
}
