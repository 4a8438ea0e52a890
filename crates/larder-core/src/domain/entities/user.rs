//! User entity.

use super::super::value_objects::Email;
use crate::{Entity, UserId};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A user record as held by the durable store.
///
/// The cache only ever holds serialized copies of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Unique login handle.
    pub username: String,

    /// Unique email address.
    pub email: Email,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with a fresh ID.
    ///
    /// Timestamps are truncated to microseconds, the precision the store keeps.
    #[must_use]
    pub fn new(name: impl Into<String>, username: impl Into<String>, email: Email) -> Self {
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: UserId::new(),
            name: name.into(),
            username: username.into(),
            email,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial profile change and bumps `updated_at`.
    ///
    /// Returns true if any field actually changed.
    pub fn apply_changes(
        &mut self,
        name: Option<String>,
        username: Option<String>,
        email: Option<Email>,
    ) -> bool {
        let mut changed = false;
        if let Some(name) = name.filter(|n| *n != self.name) {
            self.name = name;
            changed = true;
        }
        if let Some(username) = username.filter(|u| *u != self.username) {
            self.username = username;
            changed = true;
        }
        if let Some(email) = email.filter(|e| *e != self.email) {
            self.email = email;
            changed = true;
        }
        if changed {
            self.updated_at = Utc::now().trunc_subsecs(6);
        }
        changed
    }
}

impl Entity<UserId> for User {
    fn id(&self) -> &UserId {
        &self.id
    }
}
