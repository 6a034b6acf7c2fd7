//! User model. Users are the principals behind bearer tokens.

use folio_core::actor::Principal;
use folio_core::roles::Role;
use folio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user row from the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub role: Option<String>,
    pub is_superuser: bool,
    pub capabilities: Vec<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub role: Option<Role>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl CreateUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }
}

impl User {
    /// Convert to the identity the permission evaluator works with.
    ///
    /// A role string the database accepts but this build does not know is
    /// treated as no role.
    pub fn into_principal(self) -> Principal {
        Principal {
            id: self.id,
            username: self.username,
            role: self.role.and_then(|r| r.parse().ok()),
            is_superuser: self.is_superuser,
            capabilities: self.capabilities.into_iter().collect(),
        }
    }
}
