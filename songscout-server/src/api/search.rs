//! Aggregated search and type-ahead suggestions

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{required_param, ApiResult};
use crate::services::{SearchOutcome, Suggestion};
use crate::AppState;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_SUGGEST_LIMIT: usize = 6;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
}

/// GET /search?q=&limit=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchOutcome>> {
    let query = required_param(params.q, "q")?;
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    Ok(Json(state.aggregator.search(&query, limit).await))
}

/// GET /suggest?q=&limit=
///
/// Never fails; short or missing queries get an empty list.
pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SuggestResponse> {
    let query = params.q.unwrap_or_default().trim().to_string();
    let limit = params.limit.unwrap_or(DEFAULT_SUGGEST_LIMIT);
    let suggestions = state.aggregator.suggest(&query, limit).await;

    Json(SuggestResponse { query, suggestions })
}
