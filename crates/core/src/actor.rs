//! The requesting principal.
//!
//! An [`Actor`] is resolved once per request by the authentication layer.
//! Everything the permission evaluator needs (identity, role profile and
//! named capabilities) is carried explicitly; nothing is looked up lazily.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::roles::Role;
use crate::types::DbId;

/// An authenticated user together with the grants resolved for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: DbId,
    pub username: String,
    /// Role profile, if the account has one. `None` denies every role-gated
    /// action.
    pub role: Option<Role>,
    /// Superusers hold every named capability.
    pub is_superuser: bool,
    pub capabilities: BTreeSet<String>,
}

impl Principal {
    pub fn new(id: DbId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            role: None,
            is_superuser: false,
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.is_superuser || self.capabilities.contains(capability)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role.is_some_and(|role| roles.contains(&role))
    }
}

/// Who is calling: nobody in particular, or a known user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(Principal),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Actor::Anonymous => None,
            Actor::User(principal) => Some(principal),
        }
    }

    pub fn id(&self) -> Option<DbId> {
        self.principal().map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superuser_holds_every_capability() {
        let root = Principal::new(1, "root").superuser();
        assert!(root.has_capability("articles.can_delete"));
        assert!(root.has_capability("anything.at_all"));
    }

    #[test]
    fn capabilities_are_exact_names() {
        let editor = Principal::new(2, "editor").with_capability("articles.can_edit");
        assert!(editor.has_capability("articles.can_edit"));
        assert!(!editor.has_capability("articles.can_delete"));
    }

    #[test]
    fn missing_profile_matches_no_role() {
        let plain = Principal::new(3, "plain");
        assert!(!plain.has_any_role(&Role::ALL));
        assert!(plain.clone().with_role(Role::Member).has_any_role(&[Role::Member]));
    }

    #[test]
    fn anonymous_has_no_identity() {
        assert!(!Actor::Anonymous.is_authenticated());
        assert_eq!(Actor::Anonymous.id(), None);
        assert_eq!(Actor::User(Principal::new(9, "u")).id(), Some(9));
    }
}
