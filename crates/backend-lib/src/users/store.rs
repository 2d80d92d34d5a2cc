//! In-memory user storage.
use super::{User, UserError};
use crate::metrics::USERS_STORED;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use metrics::gauge;
use uuid::Uuid;

/// Concurrent user table with a unique username index.
///
/// Usernames are case-sensitive and cannot change after insertion.
#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<Uuid, User>,
    by_username: DashMap<String, Uuid>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new user, assigning version 1
    pub fn insert(&self, mut user: User) -> Result<User, UserError> {
        match self.by_username.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(UserError::DuplicateUsername(user.username)),
            Entry::Vacant(slot) => {
                user.version = 1;
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                gauge!(USERS_STORED).set(self.users.len() as f64);
                Ok(user)
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        let id = *self.by_username.get(username)?;
        self.get(id)
    }

    /// Replace a stored user.
    ///
    /// `user.version` must match the stored version; the saved copy gets the
    /// next version.
    pub fn update(&self, user: User) -> Result<User, UserError> {
        let mut slot = self.users.get_mut(&user.id).ok_or(UserError::NotFound(user.id))?;
        if slot.version != user.version {
            return Err(UserError::VersionConflict {
                id: user.id,
                expected: user.version,
                actual: slot.version,
            });
        }

        let mut updated = user;
        updated.username = slot.username.clone();
        updated.version = slot.version + 1;
        *slot = updated.clone();
        Ok(updated)
    }

    pub fn remove(&self, id: Uuid) -> Result<User, UserError> {
        let (_, user) = self.users.remove(&id).ok_or(UserError::NotFound(id))?;
        self.by_username.remove(&user.username);
        gauge!(USERS_STORED).set(self.users.len() as f64);
        Ok(user)
    }

    /// All users ordered by username
    pub fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
