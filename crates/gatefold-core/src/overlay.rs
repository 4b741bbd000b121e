//! Overlay (modal preview) controller.
//!
//! An overlay shows a second, independently fetched payload on top of a
//! section list without navigating away. Fetches are fire-and-forget: the
//! closing path never waits for one, and nothing aborts an in-flight
//! request. Instead every open bumps a generation counter and the fetch
//! task carries the generation it was spawned under; a result whose
//! generation is no longer current is discarded on arrival. Closing bumps
//! the counter too, so a late response after close is a guaranteed no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::content::ContentSource;
use crate::page::PageId;
use crate::record::RecordMap;

/// Observable state of the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState {
    /// No overlay; the section list is fully visible.
    Closed,
    /// Overlay is up, payload still in flight.
    Loading {
        /// Page being fetched.
        page: PageId,
        /// Card title captured at open time, when known.
        title: Option<String>,
    },
    /// Overlay is up with its payload.
    Ready {
        /// Page on display.
        page: PageId,
        /// Card title captured at open time, when known.
        title: Option<String>,
        /// The fetched payload.
        record: RecordMap,
    },
    /// The fetch failed; the overlay says so instead of loading forever.
    Failed {
        /// Page that failed to load.
        page: PageId,
        /// Card title captured at open time, when known.
        title: Option<String>,
        /// Operator-facing failure description.
        reason: String,
    },
}

impl OverlayState {
    /// Whether the overlay is showing at all.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// The page the overlay is about, if open.
    #[must_use]
    pub fn page(&self) -> Option<&PageId> {
        match self {
            Self::Closed => None,
            Self::Loading { page, .. } | Self::Ready { page, .. } | Self::Failed { page, .. } => {
                Some(page)
            }
        }
    }
}

/// Drives overlay opens, closes, and their cancellable fetches.
#[derive(Clone)]
pub struct OverlayController {
    source: Arc<dyn ContentSource>,
    state: Arc<Mutex<OverlayState>>,
    generation: Arc<AtomicU64>,
}

impl OverlayController {
    /// Build a controller over a content source.
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(OverlayState::Closed)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> OverlayState {
        self.state.lock().await.clone()
    }

    /// Open the overlay for a page and start its fetch.
    ///
    /// The overlay shows `Loading` immediately; the spawned fetch applies
    /// `Ready` or `Failed` only if no close or newer open intervened. The
    /// returned handle is the fetch task — callers may await it to observe
    /// settlement (tests do); dropping it detaches the task.
    pub async fn open(&self, page: PageId, title: Option<String>) -> JoinHandle<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut state = self.state.lock().await;
            *state = OverlayState::Loading {
                page: page.clone(),
                title: title.clone(),
            };
        }

        let source = Arc::clone(&self.source);
        let shared_state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);

        tokio::spawn(async move {
            let fetched = source.get_page(&page, None).await;

            let mut state = shared_state.lock().await;
            if current.load(Ordering::SeqCst) != generation {
                debug!(page = %page, "stale overlay fetch discarded");
                return;
            }

            *state = match fetched {
                Ok(record) => OverlayState::Ready {
                    page,
                    title,
                    record,
                },
                Err(e) => OverlayState::Failed {
                    page,
                    title,
                    reason: e.to_string(),
                },
            };
        })
    }

    /// Close the overlay.
    ///
    /// Any in-flight fetch keeps running and discards its own result on
    /// arrival; no abort is needed.
    pub async fn close(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        *state = OverlayState::Closed;
    }
}
