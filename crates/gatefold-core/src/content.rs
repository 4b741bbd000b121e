//! Content-source boundary.
//!
//! The upstream workspace client is an external collaborator; this trait is
//! its interface as seen from the client side. Each nesting level fetches
//! its payload independently through this trait — there is deliberately no
//! shared cache between a section list's payload and an overlay or detail
//! fetch of the same page.

use crate::error::ContentError;
use crate::page::PageId;
use crate::record::RecordMap;

/// Fetches content payloads by page id.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync + 'static {
    /// Fetch the record map for a page.
    ///
    /// `version` is the opaque `v` token from the section configuration,
    /// passed through to the upstream verbatim when present.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the page is unknown, the upstream call
    /// fails, or the payload is not a usable record map.
    async fn get_page(
        &self,
        page: &PageId,
        version: Option<&str>,
    ) -> Result<RecordMap, ContentError>;
}
