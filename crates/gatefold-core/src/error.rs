//! Error types for `gatefold-core`.
//!
//! Each variant carries enough context to diagnose the problem without a
//! debugger. Access keys never appear in errors — only page identifiers,
//! paths, and reasons.

/// Errors from parsing a page identifier.
#[derive(Debug, thiserror::Error)]
pub enum PageIdError {
    /// The input was not a UUID in either dashed or compact form.
    #[error("invalid page id '{input}'")]
    Invalid { input: String },
}

/// Errors from fetching a content payload.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The upstream workspace does not know this page.
    #[error("page '{page_id}' not found")]
    NotFound { page_id: String },

    /// The upstream call failed (network, status, or credentials).
    #[error("upstream fetch failed: {reason}")]
    Upstream { reason: String },

    /// The payload arrived but was not a usable record map.
    #[error("malformed content payload: {reason}")]
    Malformed { reason: String },
}

/// Errors from loading a page through a client session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The path does not name a content page.
    #[error("'{path}' is not a content page")]
    NotContentPage { path: String },

    /// The detail path did not carry a parsable page id.
    #[error(transparent)]
    PageId(#[from] PageIdError),

    /// The content payload could not be fetched.
    #[error(transparent)]
    Content(#[from] ContentError),
}
