//! Batch fetch handler.

use super::{FactsQuery, FactsResponse};
use crate::api::AppState;
use crate::error::Result;
use axum::{
    Json,
    extract::{Query, State},
};

/// GET /facts - Fetch a batch of facts concurrently
///
/// Every task's outcome is reported in index order; individual failures do
/// not fail the request.
#[utoipa::path(
    get,
    path = "/facts",
    tag = "facts",
    params(FactsQuery),
    responses(
        (status = 200, description = "Batch finished; one outcome per index", body = FactsResponse),
        (status = 400, description = "Malformed query string"),
        (status = 401, description = "Missing or invalid API key", body = crate::error::ApiError),
        (status = 422, description = "Requested batch exceeds batch.max_size", body = crate::error::ApiError)
    )
)]
pub async fn get_facts(
    State(state): State<AppState>,
    Query(query): Query<FactsQuery>,
) -> Result<Json<FactsResponse>> {
    let count = query
        .count
        .unwrap_or(state.fetcher.config().batch.default_size);
    let batch = state.fetcher.fetch_batch(count).await?;

    Ok(Json(FactsResponse::from_batch(&batch)))
}
