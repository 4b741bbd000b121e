//! Access-guard state machine.
//!
//! One guard gates one protected region. The states are explicit so the
//! illegal combinations (granted while still loading, locked after a
//! grant) are unrepresentable:
//!
//! ```text
//! Loading ──resolve──▶ Granted
//!    │
//!    └────resolve──▶ Locked ──valid key──▶ Granted
//! ```
//!
//! `Locked -> Granted` is one-way; nothing re-locks within a session. The
//! two delays exist to give the shell's visual transitions a fixed budget
//! and are part of the observable behavior: a successful unlock grants
//! after [`UNLOCK_DELAY`], and a failed attempt reports a transient error
//! that clears itself after [`ERROR_CLEAR`].

use std::time::Duration;

use tokio::time::Instant;

use crate::access::AccessControl;
use crate::role::{Requirement, Role};

/// Pause between a successful key submission and the grant.
pub const UNLOCK_DELAY: Duration = Duration::from_millis(750);

/// How long a failed submission's error indicator stays up.
pub const ERROR_CLEAR: Duration = Duration::from_millis(1200);

/// Observable state of a guarded region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Role resolution has not completed; render nothing observable.
    Loading,
    /// Content is present but inert behind the unlock affordance.
    Locked,
    /// Content is fully interactive.
    Granted,
}

/// Result of submitting a candidate key to a locked guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The key resolved; the guard is now granted.
    Granted(Role),
    /// The key resolved to nothing; the guard stays locked.
    Denied,
}

/// Gate for one protected region.
#[derive(Debug)]
pub struct AccessGuard {
    requirement: Requirement,
    state: GuardState,
    error_until: Option<Instant>,
}

impl AccessGuard {
    /// New guard in `Loading`, gated on the given requirement.
    #[must_use]
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            state: GuardState::Loading,
            error_until: None,
        }
    }

    /// The requirement this guard enforces.
    #[must_use]
    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Whether a failed submission's error indicator is still showing.
    #[must_use]
    pub fn showing_error(&self) -> bool {
        self.error_until.is_some_and(|until| Instant::now() < until)
    }

    /// Feed the resolved role into a loading guard.
    ///
    /// Only meaningful in `Loading`; a guard that already granted stays
    /// granted even if a later resolution comes back weaker.
    pub fn resolve(&mut self, role: Role) {
        if self.state == GuardState::Loading {
            self.state = if role.satisfies(self.requirement) {
                GuardState::Granted
            } else {
                GuardState::Locked
            };
        }
    }

    /// Submit a candidate key through the unlock affordance.
    ///
    /// Any key the registry recognizes unlocks the region for this session
    /// (the durable effect is the access-store write inside
    /// [`AccessControl::apply_key`]); the grant lands after
    /// [`UNLOCK_DELAY`]. An unrecognized key raises the transient error
    /// indicator and leaves the guard locked, with no durable effect.
    ///
    /// Submissions outside `Locked` are ignored and reported as denied
    /// without touching storage.
    pub async fn submit(&mut self, control: &AccessControl, input: &str) -> UnlockOutcome {
        if self.state != GuardState::Locked {
            return UnlockOutcome::Denied;
        }

        let role = control.apply_key(input).await;
        if role.is_none() {
            self.error_until = Some(Instant::now() + ERROR_CLEAR);
            return UnlockOutcome::Denied;
        }

        self.error_until = None;
        tokio::time::sleep(UNLOCK_DELAY).await;
        self.state = GuardState::Granted;
        UnlockOutcome::Granted(role)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::access::{AccessStore, SECRET_KEY};
    use crate::registry::{KEY_ARCHIVE, KEY_FULL, KeyRegistry};
    use gatefold_storage::{ClientStore, MemoryStore};
    use std::sync::Arc;

    fn control(store: &MemoryStore) -> AccessControl {
        AccessControl::new(
            KeyRegistry::default(),
            AccessStore::new(Arc::new(store.clone())),
        )
    }

    #[tokio::test]
    async fn sufficient_role_grants_from_loading() {
        let mut guard = AccessGuard::new(Requirement::Archive);
        assert_eq!(guard.state(), GuardState::Loading);
        guard.resolve(Role::Full);
        assert_eq!(guard.state(), GuardState::Granted);
    }

    #[tokio::test]
    async fn insufficient_role_locks_from_loading() {
        let mut guard = AccessGuard::new(Requirement::Full);
        guard.resolve(Role::Archive);
        assert_eq!(guard.state(), GuardState::Locked);
    }

    #[tokio::test]
    async fn later_resolution_never_downgrades_a_grant() {
        let mut guard = AccessGuard::new(Requirement::Archive);
        guard.resolve(Role::Archive);
        guard.resolve(Role::None);
        assert_eq!(guard.state(), GuardState::Granted);
    }

    #[tokio::test(start_paused = true)]
    async fn valid_key_grants_after_unlock_delay() {
        let store = MemoryStore::new();
        let control = control(&store);
        let mut guard = AccessGuard::new(Requirement::Archive);
        guard.resolve(Role::None);

        let started = Instant::now();
        let outcome = guard.submit(&control, KEY_ARCHIVE).await;

        assert_eq!(outcome, UnlockOutcome::Granted(Role::Archive));
        assert_eq!(guard.state(), GuardState::Granted);
        assert!(started.elapsed() >= UNLOCK_DELAY);
        // The durable side effect: the key is persisted.
        assert_eq!(
            store.get(SECRET_KEY).await.unwrap().as_deref(),
            Some(KEY_ARCHIVE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn any_registered_key_unlocks_the_session() {
        // A region gated on Full still unlocks with a valid Archive key:
        // the registry recognized it, so the session-level grant applies.
        let store = MemoryStore::new();
        let control = control(&store);
        let mut guard = AccessGuard::new(Requirement::Full);
        guard.resolve(Role::None);

        let outcome = guard.submit(&control, KEY_ARCHIVE).await;
        assert_eq!(outcome, UnlockOutcome::Granted(Role::Archive));
        assert_eq!(guard.state(), GuardState::Granted);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_key_raises_transient_error_then_clears() {
        let store = MemoryStore::new();
        let control = control(&store);
        let mut guard = AccessGuard::new(Requirement::Archive);
        guard.resolve(Role::None);

        let outcome = guard.submit(&control, "WRONG").await;
        assert_eq!(outcome, UnlockOutcome::Denied);
        assert_eq!(guard.state(), GuardState::Locked);
        assert!(guard.showing_error());

        tokio::time::advance(ERROR_CLEAR + Duration::from_millis(1)).await;
        assert!(!guard.showing_error());
    }

    #[tokio::test]
    async fn failed_submit_has_no_durable_effect() {
        let store = MemoryStore::new();
        let control = control(&store);
        control.apply_key(KEY_FULL).await;

        let mut guard = AccessGuard::new(Requirement::Full);
        guard.resolve(Role::None);
        guard.submit(&control, "WRONG").await;

        assert_eq!(
            store.get(SECRET_KEY).await.unwrap().as_deref(),
            Some(KEY_FULL)
        );
    }

    #[tokio::test]
    async fn submit_outside_locked_is_ignored() {
        let store = MemoryStore::new();
        let control = control(&store);

        // Still loading: no submission possible.
        let mut guard = AccessGuard::new(Requirement::Archive);
        assert_eq!(guard.submit(&control, KEY_FULL).await, UnlockOutcome::Denied);
        assert_eq!(guard.state(), GuardState::Loading);
        assert_eq!(store.get(SECRET_KEY).await.unwrap(), None);

        // Already granted: nothing changes.
        guard.resolve(Role::Full);
        assert_eq!(guard.submit(&control, "WRONG").await, UnlockOutcome::Denied);
        assert_eq!(guard.state(), GuardState::Granted);
    }
}
