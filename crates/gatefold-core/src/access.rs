//! Access store and access-control service.
//!
//! The store persists the raw last-applied key string — not the resolved
//! role — so role resolution is redone on every page load against the
//! current registry. Storage failures degrade silently to "no persisted
//! key": this is a soft gate, not a security boundary, and an unavailable
//! store must never take the page down with it.

use std::sync::Arc;

use tracing::debug;

use gatefold_storage::ClientStore;

use crate::registry::KeyRegistry;
use crate::role::Role;

/// Store entry holding the last successfully applied key.
pub const SECRET_KEY: &str = "access/secret";

/// Persists the currently held key in a client store.
#[derive(Clone)]
pub struct AccessStore {
    store: Arc<dyn ClientStore>,
}

impl AccessStore {
    /// Wrap a persistent-scope client store.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self { store }
    }

    /// Read the persisted key, if any. Storage failure reads as absent.
    pub async fn load(&self) -> Option<String> {
        match self.store.get(SECRET_KEY).await {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "access store unavailable, treating as absent");
                None
            }
        }
    }

    /// Overwrite the persisted key. Storage failure is a silent no-op.
    pub async fn save(&self, key: &str) {
        if let Err(e) = self.store.put(SECRET_KEY, key).await {
            debug!(error = %e, "access store unavailable, key not persisted");
        }
    }

    /// Forget the persisted key. Storage failure is a silent no-op.
    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(SECRET_KEY).await {
            debug!(error = %e, "access store unavailable, key not cleared");
        }
    }
}

/// Resolves the effective role for the current page load.
#[derive(Clone)]
pub struct AccessControl {
    registry: KeyRegistry,
    store: AccessStore,
}

impl AccessControl {
    /// Build a service over a registry and a persistent-scope store.
    #[must_use]
    pub fn new(registry: KeyRegistry, store: AccessStore) -> Self {
        Self { registry, store }
    }

    /// The key table in use.
    #[must_use]
    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// The underlying access store.
    #[must_use]
    pub fn store(&self) -> &AccessStore {
        &self.store
    }

    /// Resolve the effective role for a page load.
    ///
    /// A URL key that resolves to a non-`None` role always wins and is
    /// persisted (share-a-link unlocking); otherwise the stored key is
    /// resolved; otherwise the role is `None`. Re-run on every load, never
    /// cached across loads — idempotent given the same URL parameter and
    /// storage state.
    pub async fn resolve(&self, url_key: Option<&str>) -> Role {
        if let Some(candidate) = url_key {
            let role = self.registry.resolve(candidate);
            if !role.is_none() {
                self.store.save(candidate.trim()).await;
                return role;
            }
        }

        match self.store.load().await {
            Some(stored) => self.registry.resolve(&stored),
            None => Role::None,
        }
    }

    /// Apply a manually entered key.
    ///
    /// Trims the input, resolves it, and persists it only on success:
    /// an invalid key leaves whatever valid key was previously stored
    /// untouched. Returns the resolved role (`None` on failure).
    pub async fn apply_key(&self, input: &str) -> Role {
        let candidate = input.trim();
        let role = self.registry.resolve(candidate);
        if !role.is_none() {
            self.store.save(candidate).await;
        }
        role
    }
}
