//! Roles and requirements.
//!
//! A [`Role`] is the resolved permission level of the current client; a
//! [`Requirement`] is the level attached to a protected region. Roles form
//! a total order, not a capability set: `Full` implies everything `Archive`
//! grants, and a role satisfies a requirement exactly when its rank is at
//! least the requirement's rank.

use std::fmt;

/// Resolved permission level for the current client.
///
/// At most one role is current per client session. Variant order matters:
/// the derived `Ord` is the permission order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    /// No key applied, or the applied key matched nothing.
    #[default]
    None,
    /// Unlocks the archive section.
    Archive,
    /// Unlocks everything.
    Full,
}

/// Permission level attached to a protected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Satisfied by `Archive` or `Full`.
    Archive,
    /// Satisfied only by `Full`.
    Full,
}

impl Role {
    /// Whether this role grants access to a region with the given
    /// requirement. `Full` satisfies any requirement; `Archive` satisfies
    /// only an `Archive` requirement; `None` satisfies nothing.
    #[must_use]
    pub fn satisfies(self, requirement: Requirement) -> bool {
        self >= requirement.minimum_role()
    }

    /// Whether any key has been resolved at all.
    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl Requirement {
    /// The smallest role that satisfies this requirement.
    #[must_use]
    pub fn minimum_role(self) -> Role {
        match self {
            Self::Archive => Role::Archive,
            Self::Full => Role::Full,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Archive => "archive",
            Self::Full => "full",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Archive => "archive",
            Self::Full => "full",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_satisfies_every_requirement() {
        assert!(Role::Full.satisfies(Requirement::Archive));
        assert!(Role::Full.satisfies(Requirement::Full));
    }

    #[test]
    fn archive_satisfies_only_archive() {
        assert!(Role::Archive.satisfies(Requirement::Archive));
        assert!(!Role::Archive.satisfies(Requirement::Full));
    }

    #[test]
    fn none_satisfies_nothing() {
        assert!(!Role::None.satisfies(Requirement::Archive));
        assert!(!Role::None.satisfies(Requirement::Full));
    }

    #[test]
    fn roles_are_totally_ordered() {
        assert!(Role::None < Role::Archive);
        assert!(Role::Archive < Role::Full);
    }
}
