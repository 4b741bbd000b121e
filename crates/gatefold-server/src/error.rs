//! HTTP error types for the Gatefold server.
//!
//! Maps domain errors from `gatefold-core` into HTTP responses. Every
//! error variant produces a JSON body with a machine-readable `error`
//! field and a human-readable `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gatefold_core::error::ContentError;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Client sent invalid input.
    BadRequest(String),
    /// Requested page does not exist upstream.
    NotFound(String),
    /// The upstream rejected or failed an exchange (e.g., attachment
    /// signing) — the request was fine, the upstream leg was not.
    BadGateway(String),
    /// Internal server error.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound { .. } => Self::NotFound(err.to_string()),
            ContentError::Upstream { .. } | ContentError::Malformed { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}
