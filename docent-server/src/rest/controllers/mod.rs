pub mod openapi;
pub mod query;

/// `GET /health`
pub async fn health() -> &'static str {
    "OK"
}
