//! Image proxy route: `GET /image-proxy?url=&blockId=`.
//!
//! Streams image bytes from the upstream host, exchanging
//! private-attachment references for signed URLs first. Unlike the content
//! endpoint, images are long-cacheable: an hour fresh plus a day of
//! stale-while-revalidate.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use tracing::warn;

use gatefold_core::record::ATTACHMENT_SCHEME;

use crate::error::AppError;
use crate::proxy;
use crate::state::AppState;

/// Build the image-proxy router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/image-proxy", get(get_image))
}

/// Query parameters for an image fetch.
#[derive(Debug, Deserialize)]
struct ImageParams {
    /// Source URL, possibly an `attachment:` reference.
    url: Option<String>,
    /// Owning block id — required for the attachment path.
    #[serde(rename = "blockId", default)]
    block_id: Option<String>,
}

/// Content type assumed when the upstream does not say.
const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Proxy one image.
async fn get_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImageParams>,
) -> Result<Response, AppError> {
    let Some(url) = params.url else {
        return Err(AppError::BadRequest("missing url".to_owned()));
    };

    let resolved = if url.starts_with(ATTACHMENT_SCHEME) {
        // The lookup fails closed: without the owning block there is no
        // permission record to exchange, so no upstream call is attempted.
        let block_id = params.block_id.unwrap_or_default();
        if block_id.is_empty() {
            return Err(AppError::BadGateway(
                "attachment url without owning block".to_owned(),
            ));
        }

        match state.signer.sign(&url, &block_id).await {
            Some(signed) => signed,
            None => {
                warn!(%block_id, "attachment could not be resolved");
                return Err(AppError::BadGateway(
                    "failed to resolve attachment url".to_owned(),
                ));
            }
        }
    } else {
        url
    };

    let upstream = proxy::fetch_with_retry(&state.http, &resolved)
        .await
        .map_err(|e| {
            warn!(error = %e, "image fetch failed");
            AppError::Internal("image fetch failed".to_owned())
        })?;

    let status = upstream.status();
    if !status.is_success() {
        // Surface the upstream status rather than masking it.
        let mapped =
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return Ok((
            mapped,
            axum::Json(serde_json::json!({
                "error": "upstream_status",
                "message": format!("image host answered {status}"),
            })),
        )
            .into_response());
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_owned();

    let bytes = upstream.bytes().await.map_err(|e| {
        warn!(error = %e, "image body read failed");
        AppError::Internal("image body read failed".to_owned())
    })?;

    let mut response = bytes.into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600, stale-while-revalidate=86400"),
    );
    Ok(response)
}
