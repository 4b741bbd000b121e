//! Content route: `GET /content/{page_id}`.
//!
//! Serves the record map for a page. The payload is always fetched fresh
//! and marked no-store — the client's layered router re-fetches per level
//! by design, and stale gated content is worse than a slow reload.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use tracing::warn;

use gatefold_core::page::PageId;

use crate::error::AppError;
use crate::state::AppState;

/// Build the content router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/content/{page_id}", get(get_content))
}

/// Query parameters for a content fetch.
#[derive(Debug, Deserialize)]
struct ContentParams {
    /// Opaque version token, forwarded to the upstream.
    v: Option<String>,
}

/// Fetch a page's record map.
async fn get_content(
    State(state): State<Arc<AppState>>,
    Path(page_id): Path<String>,
    Query(params): Query<ContentParams>,
) -> Result<Response, AppError> {
    let page = PageId::parse(&page_id)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let record = state
        .source
        .get_page(&page, params.v.as_deref())
        .await
        .map_err(|e| {
            warn!(page = %page, error = %e, "content fetch failed");
            AppError::from(e)
        })?;

    let mut response =
        axum::Json(serde_json::json!({ "recordMap": record })).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, must-revalidate"),
    );
    Ok(response)
}
