//! Storage error types.
//!
//! Every error variant carries enough context to diagnose the problem
//! without a debugger. Values are never included — only keys and reasons.

/// Errors that can occur during client-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to open or create the backing store.
    #[error("failed to open store at '{path}': {reason}")]
    Open { path: String, reason: String },

    /// Failed to read a value from the store.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Failed to write a value to the store.
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Failed to remove a key from the store.
    #[error("failed to remove key '{key}': {reason}")]
    Delete { key: String, reason: String },
}
