//! Role-based gating of navigable views.

use std::fmt;

use entity::Role;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not signed in")]
    Unauthenticated,
    #[error("role {role} may not open {resource} (allowed: {allowed})")]
    Denied {
        role: Role,
        resource: String,
        allowed: RoleSet,
    },
}

/// Small set of roles, stored as a bitmask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);
    pub const HR: RoleSet = RoleSet::only(Role::Hr);
    pub const MANAGER: RoleSet = RoleSet::only(Role::Manager);
    pub const EMPLOYEE: RoleSet = RoleSet::only(Role::Employee);
    pub const HR_OR_MANAGER: RoleSet = RoleSet::HR.union(RoleSet::MANAGER);

    const fn bit(role: Role) -> u8 {
        match role {
            Role::Hr => 1,
            Role::Manager => 2,
            Role::Employee => 4,
        }
    }

    pub const fn only(role: Role) -> Self {
        RoleSet(Self::bit(role))
    }

    pub const fn union(self, other: RoleSet) -> Self {
        RoleSet(self.0 | other.0)
    }

    pub const fn contains(self, role: Role) -> bool {
        self.0 & Self::bit(role) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RoleSet::EMPTY, |set, role| set.union(RoleSet::only(role)))
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Role::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Outcome of guarding a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow(Role),
    /// Signed in, but the role is outside the view's set.
    Deny(Role),
    /// No identity; send the user to the entry view.
    RedirectToEntry,
}

/// Pure function of the required set and the current role.
pub fn check(required: RoleSet, role: Option<Role>) -> GuardDecision {
    match role {
        None => GuardDecision::RedirectToEntry,
        Some(role) if required.contains(role) => GuardDecision::Allow(role),
        Some(role) => GuardDecision::Deny(role),
    }
}

/// [`check`] as a `Result`, for operations that run outside navigation.
pub fn require(required: RoleSet, role: Option<Role>, resource: &str) -> Result<Role, AuthzError> {
    match check(required, role) {
        GuardDecision::Allow(role) => Ok(role),
        GuardDecision::RedirectToEntry => Err(AuthzError::Unauthenticated),
        GuardDecision::Deny(role) => Err(AuthzError::Denied {
            role,
            resource: resource.to_string(),
            allowed: required,
        }),
    }
}
