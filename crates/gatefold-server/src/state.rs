//! Shared application state for the Gatefold server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. The content source and attachment signer are
//! trait objects so tests can stand in for the upstream workspace.

use std::sync::Arc;

use gatefold_core::content::ContentSource;

use crate::upstream::AttachmentSigner;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Page fetches.
    pub source: Arc<dyn ContentSource>,
    /// Private-attachment signed-URL exchange.
    pub signer: Arc<dyn AttachmentSigner>,
    /// Outbound client for image byte fetches.
    pub http: reqwest::Client,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
