//! Client-store abstraction for Gatefold.
//!
//! This crate defines the [`ClientStore`] trait — a string key-value
//! interface modeling the per-client storage the access and navigation
//! layers persist into. It knows nothing about roles, keys, or content;
//! the domain logic in `gatefold-core` is written against the trait so a
//! test can swap in a fake without touching any ambient state.
//!
//! Two implementations are provided:
//!
//! - [`MemoryStore`] — in-memory, session-scoped; state lives exactly as
//!   long as the owning session. Also the test fake.
//! - [`JsonFileStore`] — persistent, backed by a single JSON document on
//!   disk; the durable analog of origin-scoped client storage.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// A pluggable string key-value client store.
///
/// Keys and values are plain UTF-8 strings. Entries persist until removed
/// (or, for session-scoped implementations, until the session ends).
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait ClientStore: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the underlying store fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a key-value pair, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the underlying store fails.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Idempotent — removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Delete`] if the underlying store fails.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
