//! Upstream workspace client.
//!
//! Talks to the document workspace's private JSON API: page fetches via
//! `loadPageChunk`, and the authenticated `getSignedFileUrls` exchange that
//! turns private-attachment references into short-lived signed URLs.
//! Credentials are optional; without them page fetches still work for
//! public content and attachment signing degrades to "unresolvable"
//! instead of failing the request.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, warn};

use gatefold_core::content::ContentSource;
use gatefold_core::error::ContentError;
use gatefold_core::page::PageId;
use gatefold_core::record::RecordMap;

use crate::config::WorkspaceConfig;

/// Exchanges a private-attachment reference for a signed URL.
///
/// Never fails loudly: any problem — missing credentials, missing owning
/// block, upstream refusal — answers `None`, and the caller decides what
/// an unresolvable attachment means for its response.
#[async_trait::async_trait]
pub trait AttachmentSigner: Send + Sync + 'static {
    /// Resolve one attachment reference owned by the given block.
    async fn sign(&self, attachment_url: &str, block_id: &str) -> Option<String>;
}

/// HTTP client for the upstream workspace API.
pub struct WorkspaceClient {
    http: reqwest::Client,
    config: WorkspaceConfig,
}

impl WorkspaceClient {
    /// Build a client over the given workspace settings.
    #[must_use]
    pub fn new(http: reqwest::Client, config: WorkspaceConfig) -> Self {
        Self { http, config }
    }

    /// The `cookie` header value carrying the session credentials.
    fn cookie(&self, token: &str) -> String {
        match &self.config.active_user {
            Some(user) => format!("token_v2={token}; notion_user_id={user}"),
            None => format!("token_v2={token}"),
        }
    }

    /// Replace every private-attachment image source in the record map
    /// with its signed URL. Unresolvable attachments keep their original
    /// source — the proxy path gets another chance at render time.
    pub async fn resolve_attachments(&self, record: &mut RecordMap) {
        for (block_id, source) in record.attachment_images() {
            match self.sign(&source, &block_id).await {
                Some(signed) => record.set_image_source(&block_id, &signed),
                None => debug!(%block_id, "attachment left unresolved"),
            }
        }
    }
}

#[async_trait::async_trait]
impl ContentSource for WorkspaceClient {
    async fn get_page(
        &self,
        page: &PageId,
        version: Option<&str>,
    ) -> Result<RecordMap, ContentError> {
        let mut request = self
            .http
            .post(format!("{}/loadPageChunk", self.config.api_base))
            .json(&json!({
                "pageId": page.dashed(),
                "limit": 100,
                "chunkNumber": 0,
                "verticalColumns": false,
                "cursor": { "stack": [] },
            }));

        // Opaque version token, forwarded verbatim.
        if let Some(v) = version {
            request = request.query(&[("v", v)]);
        }

        if let Some(token) = &self.config.token {
            request = request.header(reqwest::header::COOKIE, self.cookie(token));
        }

        let response = request.send().await.map_err(|e| ContentError::Upstream {
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound {
                page_id: page.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ContentError::Upstream {
                reason: format!("status {status}"),
            });
        }

        let body: Value = response.json().await.map_err(|e| ContentError::Malformed {
            reason: e.to_string(),
        })?;

        let record_map = body
            .get("recordMap")
            .cloned()
            .ok_or_else(|| ContentError::Malformed {
                reason: "response carries no record map".to_owned(),
            })?;

        let mut record = RecordMap::new(record_map);
        self.resolve_attachments(&mut record).await;
        Ok(record)
    }
}

#[async_trait::async_trait]
impl AttachmentSigner for WorkspaceClient {
    async fn sign(&self, attachment_url: &str, block_id: &str) -> Option<String> {
        let Some(token) = &self.config.token else {
            debug!("no workspace token, attachment signing disabled");
            return None;
        };
        if block_id.is_empty() {
            return None;
        }

        // The exchange wants the bare reference, without any query string.
        let clean_url = attachment_url.split('?').next().unwrap_or(attachment_url);

        let response = self
            .http
            .post(format!("{}/getSignedFileUrls", self.config.api_base))
            .header(reqwest::header::COOKIE, self.cookie(token))
            .header(
                "x-notion-active-user-header",
                self.config.active_user.as_deref().unwrap_or(""),
            )
            .header("notion-audit-log-platform", "web")
            .json(&json!({
                "urls": [{
                    "url": clean_url,
                    "permissionRecord": { "table": "block", "id": block_id },
                }],
            }))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(block_id, error = %e, "signed-url exchange failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(block_id, status = %response.status(), "signed-url exchange refused");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(block_id, error = %e, "signed-url response unreadable");
                return None;
            }
        };

        body.get("signedUrls")?
            .get(0)?
            .as_str()
            .map(str::to_owned)
    }
}

/// Share one client as both collaborator roles.
#[must_use]
pub fn split(client: WorkspaceClient) -> (Arc<dyn ContentSource>, Arc<dyn AttachmentSigner>) {
    let client = Arc::new(client);
    let source: Arc<dyn ContentSource> = client.clone();
    let signer: Arc<dyn AttachmentSigner> = client;
    (source, signer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: Option<&str>, user: Option<&str>) -> WorkspaceClient {
        WorkspaceClient::new(
            reqwest::Client::new(),
            WorkspaceConfig {
                api_base: "http://127.0.0.1:9".to_owned(),
                token: token.map(str::to_owned),
                active_user: user.map(str::to_owned),
            },
        )
    }

    #[tokio::test]
    async fn signing_without_credentials_resolves_nothing() {
        // No network: the credential check short-circuits.
        let unsigned = client(None, None).sign("attachment:abc", "block-1").await;
        assert_eq!(unsigned, None);
    }

    #[tokio::test]
    async fn signing_without_block_id_resolves_nothing() {
        let unsigned = client(Some("tok"), None).sign("attachment:abc", "").await;
        assert_eq!(unsigned, None);
    }

    #[test]
    fn cookie_carries_the_active_user_when_present() {
        assert_eq!(client(Some("tok"), None).cookie("tok"), "token_v2=tok");
        assert_eq!(
            client(Some("tok"), Some("user-1")).cookie("tok"),
            "token_v2=tok; notion_user_id=user-1"
        );
    }
}
