//! JSON-file client store.
//!
//! Persists entries as a single flat JSON object on disk. This is the
//! durable analog of origin-scoped client storage: a handful of small
//! string entries that survive restarts. Every write rewrites the whole
//! document through a temp-file rename, so a crashed write never leaves a
//! half-written store behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::{ClientStore, StoreError};

/// A persistent client store backed by one JSON document.
///
/// The full map is held in memory and flushed on every mutation. Entries
/// are sorted by key in the serialized form, so repeated runs produce
/// byte-identical files for identical state.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Arc<RwLock<BTreeMap<String, String>>>,
}

impl JsonFileStore {
    /// Open a store at the given path, creating parent directories as
    /// needed. A missing file yields an empty store; an unreadable or
    /// corrupt file is treated the same way (logged, not fatal — the
    /// stored state is reconstructible by the user).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] if the parent directory cannot be
    /// created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Open {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
        }

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "client store unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "client store unreadable, starting empty");
                BTreeMap::new()
            }
        };

        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// Serialize the current map and rename it into place.
    async fn flush(&self, data: &BTreeMap<String, String>, key: &str) -> Result<(), StoreError> {
        let serialized =
            serde_json::to_string_pretty(data).map_err(|e| StoreError::Write {
                key: key.to_owned(),
                reason: e.to_string(),
            })?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serialized)
            .await
            .map_err(|e| StoreError::Write {
                key: key.to_owned(),
                reason: e.to_string(),
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Write {
                key: key.to_owned(),
                reason: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl ClientStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        data.insert(key.to_owned(), value.to_owned());
        self.flush(&data, key).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if data.remove(key).is_some() {
            self.flush(&data, key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("state.json")).await.unwrap();
        assert_eq!(store.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.put("access/secret", "SOME_KEY").await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let val = reopened.get("access/secret").await.unwrap();
        assert_eq!(val.as_deref(), Some("SOME_KEY"));
    }

    #[tokio::test]
    async fn remove_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.put("key", "val").await.unwrap();
        store.remove("key").await.unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "not json {{{").await.unwrap();

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), None);

        // The store must still be writable after recovering.
        store.put("key", "val").await.unwrap();
        assert_eq!(store.get("key").await.unwrap().as_deref(), Some("val"));
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.put("key", "val").await.unwrap();
        assert!(path.exists());
    }
}
