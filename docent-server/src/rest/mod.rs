pub mod controllers;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_api_key;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Build the application router.
///
/// `/query` sits behind the API-key middleware; `/health` and
/// `/openapi.json` are open.
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    let protected = Router::new()
        .route("/query", post(controllers::query::query))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .merge(protected)
        .route("/health", get(controllers::health))
        .route("/openapi.json", get(controllers::openapi::openapi))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(middleware::map_response(detail_body))
        .layer(TraceLayer::new_for_http())
}

/// Give the timeout and body-limit layers' bare responses a `{"detail"}`
/// body like every other error.
async fn detail_body(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        return response;
    }

    let detail = match response.status() {
        StatusCode::REQUEST_TIMEOUT => "request timed out",
        StatusCode::PAYLOAD_TOO_LARGE => "request body too large",
        _ => return response,
    };
    ApiError::Rejected { status: response.status(), detail: detail.to_string() }.into_response()
}
