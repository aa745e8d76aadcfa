//! # docent-server
//!
//! HTTP endpoint for Docent question answering.
//!
//! | Route | Auth | Description |
//! |-------|------|-------------|
//! | `POST /query` | `apikey` header | Answer `{"query": ...}` with a `QueryResponse` |
//! | `GET /health` | none | Liveness probe |
//! | `GET /openapi.json` | none | OpenAPI 3 document |
//!
//! Errors are returned as `{"detail": "..."}`.

pub mod auth;
pub mod config;
pub mod error;
pub mod rest;
pub mod state;
pub mod telemetry;

use std::sync::Arc;

use docent_rag::QueryPipeline;

pub use config::ServerConfig;
pub use error::{ApiError, Result};
pub use rest::create_app;
pub use state::AppState;
pub use telemetry::{LogFormat, init_telemetry};

/// Bind to `config.bind` and serve until the process receives Ctrl-C.
///
/// # Errors
///
/// Returns [`ApiError::Io`] if the address cannot be bound or the server
/// fails while running.
pub async fn serve(config: ServerConfig, pipeline: Arc<QueryPipeline>) -> Result<()> {
    let state = AppState::new(pipeline, config.api_keys.clone());
    let app = create_app(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, collection = %config.collection, "docent server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("docent server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
