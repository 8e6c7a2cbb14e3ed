//! Handler-level error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::api::ApiError;
use crate::cache::CacheError;

/// Failures a request handler can hit.
///
/// Every variant maps to the same 500 response; the distinction only
/// matters for the log line.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("upstream API error: {0}")]
    Api(#[from] ApiError),

    #[error("cache lock poisoned")]
    LockPoisoned,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Sorry, something went wrong" })),
        )
            .into_response()
    }
}
