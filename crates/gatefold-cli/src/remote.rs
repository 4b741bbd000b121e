//! Content source backed by a running Gatefold server.
//!
//! The CLI never talks to the document workspace itself — it fetches
//! record maps from the server's content endpoint, the same surface the
//! web shell uses.

use serde_json::Value;

use gatefold_core::content::ContentSource;
use gatefold_core::error::ContentError;
use gatefold_core::page::PageId;
use gatefold_core::record::RecordMap;

/// HTTP view of the server's `/content/{page_id}` endpoint.
pub struct RemoteSource {
    http: reqwest::Client,
    base: String,
}

impl RemoteSource {
    /// Build a source against a server base address.
    #[must_use]
    pub fn new(base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait::async_trait]
impl ContentSource for RemoteSource {
    async fn get_page(
        &self,
        page: &PageId,
        version: Option<&str>,
    ) -> Result<RecordMap, ContentError> {
        let mut request = self.http.get(format!("{}/content/{page}", self.base));
        if let Some(v) = version {
            request = request.query(&[("v", v)]);
        }

        let response = request.send().await.map_err(|e| ContentError::Upstream {
            reason: format!("server unreachable: {e}"),
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound {
                page_id: page.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ContentError::Upstream {
                reason: format!("server answered {status}"),
            });
        }

        let body: Value = response.json().await.map_err(|e| ContentError::Malformed {
            reason: e.to_string(),
        })?;

        body.get("recordMap")
            .cloned()
            .map(RecordMap::new)
            .ok_or_else(|| ContentError::Malformed {
                reason: "response carries no record map".to_owned(),
            })
    }
}
