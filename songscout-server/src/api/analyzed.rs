//! Analyzed-songs log: listing and password-protected deletion

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use songscout_common::db::analyzed_songs::{delete_analyzed_songs, list_analyzed_songs};
use songscout_common::db::AnalyzedSong;

use crate::error::{ApiError, ApiResult};
use crate::pagination::Pagination;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzedSongsResponse {
    pub success: bool,
    pub data: Vec<AnalyzedSong>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub password: Option<String>,
    /// Record ids as listed in `data[].record_id`
    #[serde(default)]
    pub song_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}

/// GET /analyzed_songs?page=&limit=
pub async fn list_analyzed(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<AnalyzedSongsResponse>> {
    let pagination = Pagination::new(params.page, params.limit);
    let page = list_analyzed_songs(&state.db, pagination.limit, pagination.offset).await?;

    Ok(Json(AnalyzedSongsResponse {
        success: true,
        total_pages: pagination.total_pages(page.total),
        total: page.total,
        data: page.songs,
        page: pagination.page,
        limit: pagination.limit,
    }))
}

/// POST /delete_analyzed_songs
///
/// Body: `{"password": "...", "song_ids": [1, 2]}`. Deletion is refused
/// outright when no password is configured.
pub async fn delete_analyzed(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<Json<DeleteResponse>> {
    let Some(expected) = state.delete_password.as_deref() else {
        return Err(ApiError::Forbidden(
            "Deletion is disabled: no password configured".to_string(),
        ));
    };

    if request.password.as_deref() != Some(expected) {
        warn!("Rejected analyzed-song deletion with wrong password");
        return Err(ApiError::Forbidden("Wrong password".to_string()));
    }

    if request.song_ids.is_empty() {
        return Err(ApiError::BadRequest("No songs selected for deletion".to_string()));
    }

    let deleted_count = delete_analyzed_songs(&state.db, &request.song_ids).await?;
    info!(requested = request.song_ids.len(), deleted_count, "Deleted analyzed songs");

    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Deleted {} records", deleted_count),
        deleted_count,
    }))
}
