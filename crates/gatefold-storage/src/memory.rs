//! In-memory client store.
//!
//! Backs session-scoped state: the map lives only as long as the owning
//! process, which is exactly the lifetime of a client session here. Also
//! serves as the fake for unit tests across the workspace.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{ClientStore, StoreError};

/// An in-memory client store backed by a `BTreeMap`.
///
/// Thread-safe and async-compatible. Cloning shares the underlying map,
/// so a session and its components can hold handles to the same state.
///
/// # Examples
///
/// ```
/// # use gatefold_storage::{ClientStore, MemoryStore};
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryStore::new();
/// store.put("nav/active-index", "2").await.unwrap();
/// let val = store.get("nav/active-index").await.unwrap();
/// assert_eq!(val.as_deref(), Some("2"));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ClientStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        data.remove(key);
        Ok(())
    }
}
