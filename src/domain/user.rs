use serde::{Deserialize, Serialize};

use crate::domain::transaction::UserId;

/// An authenticated account holder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name, falling back to the email address.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Derives a display name from the local part of an email address.
pub fn display_name_from_email(email: &str) -> Option<String> {
    email
        .split('@')
        .next()
        .map(str::trim)
        .filter(|local| !local.is_empty())
        .map(str::to_string)
}

/// Whether a user is currently signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    SignedIn(User),
    #[default]
    SignedOut,
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            AuthState::SignedOut => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }
}

impl From<Option<User>> for AuthState {
    fn from(user: Option<User>) -> Self {
        match user {
            Some(user) => AuthState::SignedIn(user),
            None => AuthState::SignedOut,
        }
    }
}
