//! User accounts
//!
//! Users are kept in the store alongside incidents but no request flow
//! consumes them yet.

use std::fmt::{self, Debug, Formatter};

use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,

    /// Unique login name
    pub username: String,

    /// Password as supplied. Stored in plaintext and never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish()
    }
}

/// Data needed to create a user
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

impl NewUser {
    /// Create a new user request
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
