//! Top-level sections and the navigation-state tracker.
//!
//! The tracker answers one question per page load: which section tab is
//! active? A path that matches a section is active directly, and the index
//! is persisted to session-scoped storage. A detail path matches nothing,
//! so the tracker answers with the persisted index instead — the tab the
//! user arrived from stays highlighted without the detail page knowing its
//! own lineage.

use std::sync::Arc;

use tracing::debug;

use gatefold_storage::ClientStore;

use crate::page::PageId;

/// Path prefix under which all content pages live.
pub const DETAIL_PREFIX: &str = "/post/";

/// Session-store entry holding the last-active section index.
pub const NAV_INDEX_KEY: &str = "nav/active-index";

/// One top-level section of the publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Stable slug used in logs and the CLI.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Workspace page backing the section list.
    pub page: PageId,
    /// Opaque version token forwarded to the upstream (`v`).
    pub version: Option<String>,
}

impl Section {
    /// The section's path, without query parameters.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{DETAIL_PREFIX}{}", self.page)
    }

    /// The section's full link target, version token included.
    #[must_use]
    pub fn href(&self) -> String {
        match &self.version {
            Some(v) => format!("{}?v={v}", self.path()),
            None => self.path(),
        }
    }
}

/// The built-in section list, in tab order.
#[must_use]
pub fn default_sections() -> Vec<Section> {
    [
        (
            "direction",
            "Direction & Judgment",
            "31188738e14680a3bff7de9e9ed62509",
            "31188738e14681c4ac1a000cb268f7d3",
        ),
        (
            "craft",
            "Craft & Creation",
            "31188738e14680a79ef6e28345881efe",
            "31188738e1468156ac13000cfc799e81",
        ),
        (
            "systems",
            "Systems & Execution",
            "31188738e14680899954cf54ca10774f",
            "31188738e14681bf8ade000c364e617d",
        ),
        (
            "commerce",
            "Commerce & Conversion",
            "31188738e146803084e3e93b3ab642b3",
            "31188738e14681ec8aae000c97f5594e",
        ),
    ]
    .into_iter()
    .filter_map(|(id, label, page, version)| {
        Some(Section {
            id: id.to_owned(),
            label: label.to_owned(),
            page: PageId::parse(page).ok()?,
            version: Some(version.to_owned()),
        })
    })
    .collect()
}

/// Derives and persists the active section for the current path.
#[derive(Clone)]
pub struct NavigationTracker {
    sections: Arc<Vec<Section>>,
    session: Arc<dyn ClientStore>,
}

impl NavigationTracker {
    /// Build a tracker over an ordered section list and a session-scoped
    /// store.
    #[must_use]
    pub fn new(sections: Vec<Section>, session: Arc<dyn ClientStore>) -> Self {
        Self {
            sections: Arc::new(sections),
            session,
        }
    }

    /// The section list, in tab order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Which section the path belongs to directly, if any. Pure.
    #[must_use]
    pub fn match_section(&self, path: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|section| path.starts_with(&section.path()))
    }

    /// The active section index for the current path.
    ///
    /// A direct match is persisted as the last-known index. A non-matching
    /// path (a detail page) reads the persisted index without overwriting
    /// it; `None` when nothing was persisted this session. Storage failure
    /// degrades to the unpersisted answer.
    pub async fn active_index(&self, path: &str) -> Option<usize> {
        if let Some(index) = self.match_section(path) {
            if let Err(e) = self.session.put(NAV_INDEX_KEY, &index.to_string()).await {
                debug!(error = %e, "session store unavailable, active index not persisted");
            }
            return Some(index);
        }

        match self.session.get(NAV_INDEX_KEY).await {
            Ok(stored) => stored.and_then(|raw| raw.parse::<usize>().ok()),
            Err(e) => {
                debug!(error = %e, "session store unavailable, no remembered index");
                None
            }
        }
    }
}
