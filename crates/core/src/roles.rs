//! Well-known role profiles.
//!
//! These must match the `CHECK` constraint on `users.role` in the initial
//! migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_LIBRARIAN: &str = "librarian";
pub const ROLE_MEMBER: &str = "member";

/// Role profile attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Librarian,
    Member,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Librarian, Role::Member];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Librarian => ROLE_LIBRARIAN,
            Role::Member => ROLE_MEMBER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_LIBRARIAN => Ok(Role::Librarian),
            ROLE_MEMBER => Ok(Role::Member),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
