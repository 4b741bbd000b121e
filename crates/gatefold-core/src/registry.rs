//! Key registry: the fixed mapping from secret strings to roles.
//!
//! Keys are opaque shared capability tokens — no expiry, no revocation, no
//! per-user distinction. Comparison is exact and case-sensitive after
//! trimming surrounding whitespace from the candidate.

use crate::role::Role;

/// Key that unlocks everything.
pub const KEY_FULL: &str = "GATEFOLD_MASTER";

/// Key that unlocks only the archive section.
pub const KEY_ARCHIVE: &str = "ARCHIVE_2026";

/// Fixed mapping from access keys to roles.
///
/// [`KeyRegistry::default`] carries the built-in keys; tests and embedders
/// can supply their own table.
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    entries: Vec<(String, Role)>,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new(vec![
            (KEY_FULL.to_owned(), Role::Full),
            (KEY_ARCHIVE.to_owned(), Role::Archive),
        ])
    }
}

impl KeyRegistry {
    /// Build a registry from an explicit key table.
    #[must_use]
    pub fn new(entries: Vec<(String, Role)>) -> Self {
        Self { entries }
    }

    /// Resolve a candidate key to a role.
    ///
    /// Pure and total: the candidate is trimmed, compared exactly against
    /// the table, and unmatched input yields [`Role::None`].
    #[must_use]
    pub fn resolve(&self, candidate: &str) -> Role {
        let candidate = candidate.trim();
        self.entries
            .iter()
            .find(|(key, _)| key == candidate)
            .map_or(Role::None, |(_, role)| *role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keys_resolve() {
        let registry = KeyRegistry::default();
        assert_eq!(registry.resolve(KEY_FULL), Role::Full);
        assert_eq!(registry.resolve(KEY_ARCHIVE), Role::Archive);
    }

    #[test]
    fn unmatched_input_yields_none() {
        let registry = KeyRegistry::default();
        assert_eq!(registry.resolve(""), Role::None);
        assert_eq!(registry.resolve("WRONG"), Role::None);
        assert_eq!(registry.resolve("gatefold_master"), Role::None);
    }

    #[test]
    fn candidate_is_trimmed() {
        let registry = KeyRegistry::default();
        assert_eq!(registry.resolve("  GATEFOLD_MASTER  "), Role::Full);
        assert_eq!(registry.resolve("\tARCHIVE_2026\n"), Role::Archive);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let registry = KeyRegistry::default();
        assert_eq!(registry.resolve("Archive_2026"), Role::None);
    }

    #[test]
    fn custom_table_overrides_builtins() {
        let registry = KeyRegistry::new(vec![("OPEN_SESAME".to_owned(), Role::Full)]);
        assert_eq!(registry.resolve("OPEN_SESAME"), Role::Full);
        assert_eq!(registry.resolve(KEY_FULL), Role::None);
    }
}
