//! User records and the identity registry.
//!
//! The registry owns every user record and is the only component that
//! resolves or creates identities. Usernames are unique and case-sensitive;
//! a username mentioned before anyone registers it materializes a
//! *placeholder* record (no email, no credential) so the mention can be
//! linked and notified. Registration never claims an existing username,
//! placeholder or not.

use crate::annotate::extract_mentions;
use crate::error::{ChirpError, Result};
use crate::ids::{IdSource, UserId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A user record.
///
/// `username` is immutable once assigned; `display`, `bio` and
/// `avatar_ref` are mutable through profile updates. An empty
/// `avatar_ref` means "use a generated placeholder image".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque unique identifier, assigned at creation.
    pub id: UserId,
    /// Optional email address, unique among registered accounts.
    pub email: Option<String>,
    /// Unique, case-sensitive handle.
    pub username: String,
    /// Mutable display label.
    pub display: String,
    /// Profile bio text.
    pub bio: String,
    /// Avatar reference; empty means "use a generated placeholder".
    pub avatar_ref: String,
    /// Login secret, present only for accounts created through
    /// registration.
    pub credential_secret: Option<String>,
}

impl User {
    /// Creates a fully registered account. The display label defaults to
    /// the username.
    pub fn registered(id: UserId, email: &str, username: &str, secret: &str) -> Self {
        Self {
            id,
            email: Some(email.to_string()),
            username: username.to_string(),
            display: username.to_string(),
            bio: String::new(),
            avatar_ref: String::new(),
            credential_secret: Some(secret.to_string()),
        }
    }

    /// Creates a minimal placeholder record for a username referenced
    /// before any registration.
    pub fn placeholder(id: UserId, username: &str) -> Self {
        Self {
            id,
            email: None,
            username: username.to_string(),
            display: username.to_string(),
            bio: String::new(),
            avatar_ref: String::new(),
            credential_secret: None,
        }
    }

    /// True for records materialized by a mention rather than a
    /// registration.
    pub fn is_placeholder(&self) -> bool {
        self.credential_secret.is_none() && self.email.is_none()
    }
}

/// Stores user records and resolves identities.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: Vec<User>,
}

impl UserRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from restored records.
    pub fn from_users(users: Vec<User>) -> Self {
        Self { users }
    }

    /// All user records, in creation order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Looks up a user by exact username.
    pub fn lookup_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Looks up a user by email.
    pub fn lookup_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
    }

    /// Looks up a user by id.
    pub fn lookup_by_id(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == *id)
    }

    /// Returns the user with the given username, creating and storing a
    /// placeholder record if none exists. Idempotent.
    pub fn ensure_user(&mut self, username: &str, ids: &mut dyn IdSource) -> &User {
        if let Some(idx) = self.users.iter().position(|u| u.username == username) {
            return &self.users[idx];
        }
        debug!(username, "materializing placeholder user");
        let user = User::placeholder(UserId::new(ids.next_id()), username);
        let idx = self.users.len();
        self.users.push(user);
        &self.users[idx]
    }

    /// Registers a new account.
    ///
    /// # Errors
    /// - `Validation` if email or username is empty, or the email is
    ///   already registered
    /// - `DuplicateUsername` if the username exists, including as a
    ///   placeholder
    pub fn register(
        &mut self,
        email: &str,
        username: &str,
        secret: &str,
        ids: &mut dyn IdSource,
    ) -> Result<&User> {
        if email.is_empty() || username.is_empty() {
            return Err(ChirpError::validation("email and username are required"));
        }
        if self.lookup_by_username(username).is_some() {
            return Err(ChirpError::DuplicateUsername(username.to_string()));
        }
        if self.lookup_by_email(email).is_some() {
            return Err(ChirpError::validation(format!(
                "email '{}' is already registered",
                email
            )));
        }
        debug!(username, "registering account");
        let user = User::registered(UserId::new(ids.next_id()), email, username, secret);
        let idx = self.users.len();
        self.users.push(user);
        Ok(&self.users[idx])
    }

    /// Authenticates by username (preferred) or email.
    ///
    /// A missing stored credential compares as the empty string.
    ///
    /// # Errors
    /// - `NotFound` if no record matches the identifier
    /// - `InvalidCredentials` on secret mismatch
    pub fn authenticate(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        secret: &str,
    ) -> Result<&User> {
        let user = match (username, email) {
            (Some(name), _) => self.lookup_by_username(name),
            (None, Some(mail)) => self.lookup_by_email(mail),
            (None, None) => None,
        };
        let user = user.ok_or_else(|| ChirpError::not_found("user"))?;
        let stored = user.credential_secret.as_deref().unwrap_or("");
        if stored != secret {
            return Err(ChirpError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Updates the mutable profile fields of one record.
    ///
    /// # Errors
    /// Returns `NotFound` if the id is unknown.
    pub fn update_profile(
        &mut self,
        id: &UserId,
        display: &str,
        bio: &str,
        avatar_ref: &str,
    ) -> Result<&User> {
        let idx = self
            .users
            .iter()
            .position(|u| u.id == *id)
            .ok_or_else(|| ChirpError::not_found(format!("user '{}'", id)))?;
        let user = &mut self.users[idx];
        user.display = display.to_string();
        user.bio = bio.to_string();
        user.avatar_ref = avatar_ref.to_string();
        Ok(&self.users[idx])
    }

    /// Case-insensitive substring search over usernames and display
    /// labels.
    pub fn search(&self, query: &str) -> Vec<&User> {
        let q = query.to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                u.username.to_lowercase().contains(&q) || u.display.to_lowercase().contains(&q)
            })
            .collect()
    }

    /// Resolves the user ids a piece of post text mentions, materializing
    /// placeholders for unknown names.
    pub fn resolve_mentions(&mut self, text: &str, ids: &mut dyn IdSource) -> Vec<UserId> {
        extract_mentions(text)
            .iter()
            .map(|name| self.ensure_user(name, ids).id.clone())
            .collect()
    }
}
