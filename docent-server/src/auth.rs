//! API-key authentication.
//!
//! Requests to protected routes must carry an `apikey` header whose value is
//! one of the configured keys. The check runs as middleware, before the
//! request body is read.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the caller's key.
pub const API_KEY_HEADER: &str = "apikey";

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = request.headers().get(API_KEY_HEADER).and_then(|value| value.to_str().ok());

    match key {
        Some(key) if state.accepts(key) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "rejected request with invalid API key");
            Err(ApiError::Unauthorized("Invalid API key".to_string()))
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "rejected request without API key");
            Err(ApiError::Unauthorized("Missing API key".to_string()))
        }
    }
}
