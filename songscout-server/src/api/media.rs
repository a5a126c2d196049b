//! Playback and cover links

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::parse_source;
use super::proxy::{DEFAULT_BITRATE, DEFAULT_COVER_SIZE};
use crate::error::{required_param, ApiResult};
use crate::services::best_effort;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PlayUrlParams {
    pub id: Option<String>,
    pub source: Option<String>,
    /// Upstream bitrate code ("128", "320", "999" for best)
    pub quality: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverParams {
    pub id: Option<String>,
    pub source: Option<String>,
    pub size: Option<u32>,
}

/// `{"url": ...}`, empty when the platform has no link
#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

/// GET /play_url?id=&source=&quality=
pub async fn get_play_url(
    State(state): State<AppState>,
    Query(params): Query<PlayUrlParams>,
) -> ApiResult<Json<UrlResponse>> {
    let id = required_param(params.id, "id")?;
    let platform = parse_source(params.source.as_deref())?;
    let quality = params.quality.unwrap_or_else(|| DEFAULT_BITRATE.to_string());

    let url = best_effort(
        state.catalog.music_url(&id, platform, &quality).await,
        "play url",
    );
    Ok(Json(UrlResponse { url }))
}

/// GET /cover?id=&source=&size=
pub async fn get_cover(
    State(state): State<AppState>,
    Query(params): Query<CoverParams>,
) -> ApiResult<Json<UrlResponse>> {
    let id = required_param(params.id, "id")?;
    let platform = parse_source(params.source.as_deref())?;
    let size = params.size.unwrap_or(DEFAULT_COVER_SIZE);

    let url = best_effort(state.catalog.cover_url(&id, platform, size).await, "cover");
    Ok(Json(UrlResponse { url }))
}
