use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use docent_rag::{QueryRequest, QueryResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /query`: answer a question from the indexed corpus.
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::debug!(query_len = request.query.len(), "received query");

    let response = state.pipeline().answer(&request.query).await?;
    Ok(Json(response))
}
