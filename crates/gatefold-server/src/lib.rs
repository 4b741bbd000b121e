//! Gatefold HTTP server.
//!
//! Wires the upstream workspace client into two routes: the content
//! endpoint serving record maps to the client shell, and the image proxy
//! that streams page images (exchanging private-attachment references for
//! signed URLs on the way through).

pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod state;
pub mod upstream;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Cap on concurrent image fetches through the proxy.
const IMAGE_PROXY_CONCURRENCY: usize = 32;

/// Build the router with all routes and middleware.
#[must_use]
pub fn app(state: Arc<AppState>) -> Router {
    // Concurrency-limit the image proxy so a page full of images cannot
    // exhaust outbound connections.
    let image_routes = routes::image::router()
        .layer(tower::limit::ConcurrencyLimitLayer::new(IMAGE_PROXY_CONCURRENCY));

    Router::new()
        .merge(routes::content::router())
        .merge(image_routes)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}
