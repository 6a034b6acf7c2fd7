//! Permission evaluator.
//!
//! A [`Policies`] table maps an entity type to a list of [`Rule`]s. Each rule
//! covers some actions and names a [`Tier`]. When several rules cover the
//! same action the most specific tier decides, so an ownership rule layered
//! on top of an open-read rule governs writes on its own.
//!
//! Evaluation never fails with an error: it returns `Ok(())` or a
//! [`Denial`] naming why access was refused, which the HTTP layer maps to
//! 401 or 403.

use std::collections::HashMap;
use std::fmt;

use crate::actor::{Actor, Principal};
use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// An operation an actor may attempt on an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Delete,
    /// A resource-specific action outside plain CRUD (e.g. `shelve`).
    Custom(&'static str),
}

impl Action {
    pub const READ: &'static [Action] = &[Action::List, Action::Retrieve];
    pub const WRITE: &'static [Action] = &[
        Action::Create,
        Action::Update,
        Action::PartialUpdate,
        Action::Delete,
    ];
    pub const EDIT: &'static [Action] = &[Action::Update, Action::PartialUpdate];

    /// List and retrieve are the only actions that never mutate.
    pub fn is_read(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Delete => "delete",
            Action::Custom(name) => name,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strict a rule is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Reads for anyone, writes for authenticated actors.
    OpenRead,
    /// Every covered action needs an authenticated actor.
    Authenticated,
    /// Reads for anyone; writes need the actor to own the instance.
    Owner,
    /// Actor's role profile must be one of these.
    Roles(&'static [Role]),
    /// Actor must hold this named capability.
    Capability(&'static str),
}

impl Tier {
    fn specificity(self) -> u8 {
        match self {
            Tier::OpenRead => 0,
            Tier::Authenticated => 1,
            Tier::Roles(_) => 2,
            Tier::Owner | Tier::Capability(_) => 3,
        }
    }
}

/// Which actions a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Covers {
    All,
    Only(&'static [Action]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub covers: Covers,
    pub tier: Tier,
}

impl Rule {
    pub const fn all(tier: Tier) -> Self {
        Self {
            covers: Covers::All,
            tier,
        }
    }

    pub const fn only(actions: &'static [Action], tier: Tier) -> Self {
        Self {
            covers: Covers::Only(actions),
            tier,
        }
    }

    fn covers(&self, action: Action) -> bool {
        match self.covers {
            Covers::All => true,
            Covers::Only(actions) => actions.contains(&action),
        }
    }
}

/// Anything with a recorded owner. Entities without one return `None`, which
/// fails every ownership check.
pub trait Owned {
    fn owner_id(&self) -> Option<DbId>;
}

/// Why an action was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    NotOwner,
    MissingRole(&'static [Role]),
    MissingCapability(&'static str),
    NoRule {
        entity: String,
        action: Action,
    },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::Unauthenticated => f.write_str("Authentication credentials were not provided."),
            Denial::NotOwner => f.write_str("Only the owner of this object may modify it."),
            Denial::MissingRole(roles) => {
                let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                write!(f, "This action requires one of the roles: {}.", names.join(", "))
            }
            Denial::MissingCapability(capability) => {
                write!(f, "Missing required permission: {capability}.")
            }
            Denial::NoRule { entity, action } => {
                write!(f, "No permission rule allows {action} on {entity}.")
            }
        }
    }
}

impl From<Denial> for CoreError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => CoreError::Unauthorized(denial.to_string()),
            other => CoreError::Forbidden(other.to_string()),
        }
    }
}

/// Permission rules for every entity type, keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct Policies {
    table: HashMap<&'static str, Vec<Rule>>,
}

impl Policies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (append) rules for `entity`.
    pub fn with(mut self, entity: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.table.entry(entity).or_default().extend(rules);
        self
    }

    /// Decide whether `actor` may perform `action` on `entity`.
    ///
    /// `instance` is the existing object for object-level checks; pass `None`
    /// for collection-level checks (list, create) and for the coarse check
    /// that runs before an object is loaded.
    pub fn authorize(
        &self,
        actor: &Actor,
        action: Action,
        entity: &str,
        instance: Option<&dyn Owned>,
    ) -> Result<(), Denial> {
        let rule = self
            .table
            .get(entity)
            .into_iter()
            .flatten()
            .filter(|rule| rule.covers(action))
            // max_by_key keeps the last maximum; reverse so the first
            // registered rule wins a tie.
            .rev()
            .max_by_key(|rule| rule.tier.specificity())
            .ok_or_else(|| Denial::NoRule {
                entity: entity.to_string(),
                action,
            })?;

        evaluate(rule.tier, actor, action, instance)
    }

    pub fn allowed(
        &self,
        actor: &Actor,
        action: Action,
        entity: &str,
        instance: Option<&dyn Owned>,
    ) -> bool {
        self.authorize(actor, action, entity, instance).is_ok()
    }
}

fn evaluate(
    tier: Tier,
    actor: &Actor,
    action: Action,
    instance: Option<&dyn Owned>,
) -> Result<(), Denial> {
    match tier {
        Tier::OpenRead if action.is_read() => Ok(()),
        Tier::OpenRead | Tier::Authenticated => authenticated(actor).map(|_| ()),
        Tier::Owner if action.is_read() => Ok(()),
        Tier::Owner => {
            let principal = authenticated(actor)?;
            match instance {
                Some(obj) if obj.owner_id() != Some(principal.id) => Err(Denial::NotOwner),
                _ => Ok(()),
            }
        }
        Tier::Roles(roles) => {
            if authenticated(actor)?.has_any_role(roles) {
                Ok(())
            } else {
                Err(Denial::MissingRole(roles))
            }
        }
        Tier::Capability(capability) => {
            if authenticated(actor)?.has_capability(capability) {
                Ok(())
            } else {
                Err(Denial::MissingCapability(capability))
            }
        }
    }
}

fn authenticated(actor: &Actor) -> Result<&Principal, Denial> {
    actor.principal().ok_or(Denial::Unauthenticated)
}
