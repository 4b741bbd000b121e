//! Client session: the page-load pipeline.
//!
//! One `ClientSession` models one browsing session. Each page load resolves
//! the effective role (consuming the `key` parameter), classifies the path
//! into a content layer, fetches the payload, computes the active section
//! tab, and auto-opens the overlay when the `modal` parameter names a
//! target. The session also builds the two transition URLs: drill-in from
//! an overlay (carrying `from`) and the detail page's back action
//! (restoring the originating overlay via `modal`).

use std::sync::Arc;

use gatefold_storage::ClientStore;

use crate::access::{AccessControl, AccessStore};
use crate::content::ContentSource;
use crate::error::SessionError;
use crate::guard::AccessGuard;
use crate::navigation::{DETAIL_PREFIX, NavigationTracker, Section};
use crate::overlay::OverlayController;
use crate::page::{PageId, PageQuery};
use crate::record::RecordMap;
use crate::registry::KeyRegistry;
use crate::role::{Requirement, Role};

/// Requirement every content page is gated on.
const CONTENT_REQUIREMENT: Requirement = Requirement::Archive;

/// Which nesting level a content path renders at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLayer {
    /// A top-level section's list page.
    SectionList,
    /// A standalone detail page.
    FullDetail,
}

/// What the back affordance on a detail page should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackAction {
    /// Re-navigate to the originating section with the overlay reopened.
    RestoreOverlay {
        /// Link target: the section path with a `modal` parameter naming
        /// this detail page.
        href: String,
    },
    /// No originating section known; fall back to history navigation.
    HistoryBack,
}

/// Everything a shell needs to render one loaded page.
#[derive(Debug)]
pub struct PageView {
    /// Nesting level of the path.
    pub layer: ContentLayer,
    /// Effective role for this load.
    pub role: Role,
    /// Guard for the page's protected region, already resolved.
    pub guard: AccessGuard,
    /// Active section tab, if any is known this session.
    pub active_section: Option<usize>,
    /// Detail-page title, extracted before the root title was stripped.
    pub title: Option<String>,
    /// The payload, root title stripped.
    pub record: RecordMap,
}

/// One client's browsing session.
#[derive(Clone)]
pub struct ClientSession {
    control: AccessControl,
    tracker: NavigationTracker,
    overlay: OverlayController,
    source: Arc<dyn ContentSource>,
}

impl ClientSession {
    /// Assemble a session from its stores and collaborators.
    ///
    /// `persistent` backs the access store (survives sessions);
    /// `session_store` backs the navigation tracker (scoped to this
    /// session).
    #[must_use]
    pub fn new(
        registry: KeyRegistry,
        sections: Vec<Section>,
        persistent: Arc<dyn ClientStore>,
        session_store: Arc<dyn ClientStore>,
        source: Arc<dyn ContentSource>,
    ) -> Self {
        Self {
            control: AccessControl::new(registry, AccessStore::new(persistent)),
            tracker: NavigationTracker::new(sections, session_store),
            overlay: OverlayController::new(Arc::clone(&source)),
            source,
        }
    }

    /// The access-control service.
    #[must_use]
    pub fn control(&self) -> &AccessControl {
        &self.control
    }

    /// The navigation tracker.
    #[must_use]
    pub fn tracker(&self) -> &NavigationTracker {
        &self.tracker
    }

    /// The overlay controller.
    #[must_use]
    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    /// Classify a path into its content layer.
    ///
    /// Returns `None` for paths outside the content tree (the landing
    /// pages render local content, not workspace payloads).
    #[must_use]
    pub fn classify(&self, path: &str) -> Option<ContentLayer> {
        if !path.starts_with(DETAIL_PREFIX) {
            return None;
        }
        Some(match self.tracker.match_section(path) {
            Some(_) => ContentLayer::SectionList,
            None => ContentLayer::FullDetail,
        })
    }

    /// Load a content page.
    ///
    /// Resolves the role, fetches the payload, computes the active tab,
    /// and auto-opens the overlay named by the `modal` parameter on
    /// section-list pages. The payload is fetched regardless of the guard
    /// outcome — a locked page holds its content inert behind the unlock
    /// affordance rather than leaving a hole.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotContentPage`] for paths outside the content
    /// tree; [`SessionError::PageId`] for a malformed detail path;
    /// [`SessionError::Content`] when the fetch fails.
    pub async fn load_page(
        &self,
        path: &str,
        query: &PageQuery,
    ) -> Result<PageView, SessionError> {
        let layer = self
            .classify(path)
            .ok_or_else(|| SessionError::NotContentPage {
                path: path.to_owned(),
            })?;
        let page = page_id_from_path(path)?;

        let role = self.control.resolve(query.key.as_deref()).await;
        let mut guard = AccessGuard::new(CONTENT_REQUIREMENT);
        guard.resolve(role);

        // A section's configured version token wins over the query's.
        let version = match layer {
            ContentLayer::SectionList => self
                .tracker
                .match_section(path)
                .and_then(|index| self.tracker.sections()[index].version.clone())
                .or_else(|| query.version.clone()),
            ContentLayer::FullDetail => query.version.clone(),
        };

        let record = self.source.get_page(&page, version.as_deref()).await?;
        let active_section = self.tracker.active_index(path).await;

        let title = match layer {
            ContentLayer::FullDetail => record.title(),
            ContentLayer::SectionList => None,
        };
        let record = record.strip_root_title();

        if layer == ContentLayer::SectionList {
            if let Some(modal) = &query.modal {
                // Fire-and-forget; the overlay settles on its own.
                let _ = self.overlay.open(modal.clone(), None).await;
            }
        }

        Ok(PageView {
            layer,
            role,
            guard,
            active_section,
            title,
            record,
        })
    }

    /// Open the overlay for a card clicked on a section-list page.
    pub async fn open_card(&self, page: PageId, title: Option<String>) {
        let _ = self.overlay.open(page, title).await;
    }

    /// Drill from the open overlay into the full detail page.
    ///
    /// Closes the overlay and returns the detail URL, carrying the
    /// originating section's page id so the detail page can offer a
    /// restore-the-overlay back action.
    ///
    /// # Errors
    ///
    /// [`SessionError::PageId`] when `section_path` does not carry a page
    /// id to attribute the origin to.
    pub async fn drill_in(
        &self,
        section_path: &str,
        target: &PageId,
    ) -> Result<String, SessionError> {
        let origin = page_id_from_path(section_path)?;
        self.overlay.close().await;
        Ok(format!("{DETAIL_PREFIX}{target}?from={origin}"))
    }

    /// What the back affordance on a detail page should do.
    ///
    /// With an originating section (`from`), back re-navigates to that
    /// section with this page as the overlay target; otherwise it is plain
    /// history navigation.
    ///
    /// # Errors
    ///
    /// [`SessionError::PageId`] when `detail_path` carries no page id.
    pub fn back_action(
        &self,
        detail_path: &str,
        query: &PageQuery,
    ) -> Result<BackAction, SessionError> {
        let Some(origin) = &query.from else {
            return Ok(BackAction::HistoryBack);
        };
        let current = page_id_from_path(detail_path)?;
        Ok(BackAction::RestoreOverlay {
            href: format!("{DETAIL_PREFIX}{origin}?modal={current}"),
        })
    }
}

/// Extract the page id from a content path, tolerating a query suffix.
fn page_id_from_path(path: &str) -> Result<PageId, SessionError> {
    let raw = path
        .strip_prefix(DETAIL_PREFIX)
        .unwrap_or(path)
        .split('?')
        .next()
        .unwrap_or_default();
    Ok(PageId::parse(raw)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ContentError;
    use crate::navigation::default_sections;
    use crate::overlay::OverlayState;
    use crate::registry::{KEY_ARCHIVE, KEY_FULL};
    use crate::guard::GuardState;
    use gatefold_storage::MemoryStore;
    use serde_json::json;

    /// Source answering every fetch with a titled one-block payload.
    struct FixedSource;

    #[async_trait::async_trait]
    impl ContentSource for FixedSource {
        async fn get_page(
            &self,
            page: &PageId,
            _version: Option<&str>,
        ) -> Result<RecordMap, ContentError> {
            Ok(RecordMap::new(json!({
                "block": {
                    page.as_str(): {
                        "value": {
                            "id": page.as_str(),
                            "type": "page",
                            "properties": { "title": [["Sample Page"]] }
                        }
                    }
                }
            })))
        }
    }

    /// Source that always fails.
    struct DownSource;

    #[async_trait::async_trait]
    impl ContentSource for DownSource {
        async fn get_page(
            &self,
            _page: &PageId,
            _version: Option<&str>,
        ) -> Result<RecordMap, ContentError> {
            Err(ContentError::Upstream {
                reason: "unreachable".to_owned(),
            })
        }
    }

    fn session_with(source: Arc<dyn ContentSource>) -> ClientSession {
        ClientSession::new(
            KeyRegistry::default(),
            default_sections(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            source,
        )
    }

    fn session() -> ClientSession {
        session_with(Arc::new(FixedSource))
    }

    fn detail_id() -> PageId {
        PageId::parse("deadbeefdeadbeefdeadbeefdeadbeef").unwrap()
    }

    #[test]
    fn classify_distinguishes_the_three_path_kinds() {
        let session = session();
        let section_path = session.tracker().sections()[0].path();

        assert_eq!(session.classify("/"), None);
        assert_eq!(session.classify(&section_path), Some(ContentLayer::SectionList));
        assert_eq!(
            session.classify("/post/deadbeefdeadbeefdeadbeefdeadbeef"),
            Some(ContentLayer::FullDetail)
        );
    }

    #[tokio::test]
    async fn section_load_without_key_is_locked() {
        let session = session();
        let path = session.tracker().sections()[0].path();

        let view = session.load_page(&path, &PageQuery::default()).await.unwrap();
        assert_eq!(view.layer, ContentLayer::SectionList);
        assert_eq!(view.role, Role::None);
        assert_eq!(view.guard.state(), GuardState::Locked);
        assert_eq!(view.active_section, Some(0));
        // Content is fetched even while locked.
        assert!(view.record.root_block_id().is_some());
    }

    #[tokio::test]
    async fn url_key_unlocks_and_persists_across_loads() {
        let session = session();
        let path = session.tracker().sections()[1].path();

        let query = PageQuery::parse(&format!("key={KEY_ARCHIVE}"));
        let view = session.load_page(&path, &query).await.unwrap();
        assert_eq!(view.guard.state(), GuardState::Granted);

        // Next load without the parameter: the stored key carries it.
        let view = session.load_page(&path, &PageQuery::default()).await.unwrap();
        assert_eq!(view.role, Role::Archive);
        assert_eq!(view.guard.state(), GuardState::Granted);
    }

    #[tokio::test]
    async fn full_key_grants_content_pages_too() {
        let session = session();
        let path = session.tracker().sections()[0].path();
        let query = PageQuery::parse(&format!("key={KEY_FULL}"));

        let view = session.load_page(&path, &query).await.unwrap();
        assert_eq!(view.role, Role::Full);
        assert_eq!(view.guard.state(), GuardState::Granted);
    }

    #[tokio::test]
    async fn detail_load_extracts_title_and_strips_payload() {
        let session = session();
        let path = format!("{DETAIL_PREFIX}{}", detail_id());

        let view = session.load_page(&path, &PageQuery::default()).await.unwrap();
        assert_eq!(view.layer, ContentLayer::FullDetail);
        assert_eq!(view.title.as_deref(), Some("Sample Page"));
        // The payload itself no longer carries the title.
        assert_eq!(view.record.title(), None);
    }

    #[tokio::test]
    async fn detail_load_keeps_last_section_tab_active() {
        let session = session();
        let section_path = session.tracker().sections()[2].path();
        session
            .load_page(&section_path, &PageQuery::default())
            .await
            .unwrap();

        let detail_path = format!("{DETAIL_PREFIX}{}", detail_id());
        let view = session
            .load_page(&detail_path, &PageQuery::default())
            .await
            .unwrap();
        assert_eq!(view.active_section, Some(2));
    }

    #[tokio::test]
    async fn modal_parameter_auto_opens_the_overlay() {
        let session = session();
        let path = session.tracker().sections()[0].path();
        let query = PageQuery::parse(&format!("modal={}", detail_id()));

        session.load_page(&path, &query).await.unwrap();
        let state = session.overlay().state().await;
        assert!(state.is_open());
        assert_eq!(state.page(), Some(&detail_id()));
    }

    #[tokio::test]
    async fn card_click_opens_overlay_without_navigation() {
        let session = session();
        let path = session.tracker().sections()[0].path();
        session.load_page(&path, &PageQuery::default()).await.unwrap();

        session
            .open_card(detail_id(), Some("Card Title".to_owned()))
            .await;
        assert!(session.overlay().state().await.is_open());

        // Closing returns to the identical section state; the path never
        // changed, so there is nothing else to restore.
        session.overlay().close().await;
        assert_eq!(session.overlay().state().await, OverlayState::Closed);
    }

    #[tokio::test]
    async fn drill_in_closes_overlay_and_carries_the_origin() {
        let session = session();
        let section = &session.tracker().sections()[2];
        let section_path = section.path();
        let origin = section.page.clone();

        session.open_card(detail_id(), None).await;
        let href = session.drill_in(&section_path, &detail_id()).await.unwrap();

        assert_eq!(href, format!("{DETAIL_PREFIX}{}?from={origin}", detail_id()));
        assert_eq!(session.overlay().state().await, OverlayState::Closed);
    }

    #[tokio::test]
    async fn back_with_origin_restores_the_overlay() {
        let session = session();
        let origin = session.tracker().sections()[2].page.clone();
        let detail_path = format!("{DETAIL_PREFIX}{}", detail_id());
        let query = PageQuery::parse(&format!("from={origin}"));

        let action = session.back_action(&detail_path, &query).unwrap();
        assert_eq!(
            action,
            BackAction::RestoreOverlay {
                href: format!("{DETAIL_PREFIX}{origin}?modal={}", detail_id()),
            }
        );
    }

    #[tokio::test]
    async fn back_without_origin_is_history_navigation() {
        let session = session();
        let detail_path = format!("{DETAIL_PREFIX}{}", detail_id());

        let action = session
            .back_action(&detail_path, &PageQuery::default())
            .unwrap();
        assert_eq!(action, BackAction::HistoryBack);
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_as_content_error() {
        let session = session_with(Arc::new(DownSource));
        let path = session.tracker().sections()[0].path();

        let result = session.load_page(&path, &PageQuery::default()).await;
        assert!(matches!(result, Err(SessionError::Content(_))));
    }

    #[tokio::test]
    async fn non_content_paths_are_rejected() {
        let session = session();
        let result = session.load_page("/archive", &PageQuery::default()).await;
        assert!(matches!(result, Err(SessionError::NotContentPage { .. })));
    }
}
