//! Song detail and basic song info

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use songscout_common::Platform;

use super::parse_source;
use crate::error::{required_param, ApiError, ApiResult};
use crate::services::details::{local_song_detail, online_song_detail, SongDetail, SongHints};
use crate::services::recorder::spawn_record;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SongDetailParams {
    pub id: Option<String>,
    pub source: Option<String>,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub lyricist: Option<String>,
    pub composer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SongInfoParams {
    pub id: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SongInfo {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub lyricist: String,
    pub composer: String,
    pub duration: Option<u64>,
    pub platform_name: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /song_detail?id=&source=[&name=&artist=&album=&lyricist=&composer=]
///
/// Each successful lookup is recorded in the analyzed-songs log in the background.
pub async fn get_song_detail(
    State(state): State<AppState>,
    Query(params): Query<SongDetailParams>,
) -> ApiResult<Json<SongDetail>> {
    let id = required_param(params.id, "id")?;
    let platform = parse_source(params.source.as_deref())?;

    let detail = if platform == Platform::Local {
        let index = state
            .local_index
            .as_ref()
            .ok_or_else(|| ApiError::NotFound("Local index is not available".to_string()))?;
        local_song_detail(index.as_ref(), &id).await?
    } else {
        let hints = SongHints {
            name: non_blank(params.name),
            artist: non_blank(params.artist),
            album: params.album,
            lyricist: params.lyricist,
            composer: params.composer,
        };
        online_song_detail(state.catalog.as_ref(), &id, platform, hints).await
    };

    spawn_record(state.db.clone(), detail.to_record());

    Ok(Json(detail))
}

/// GET /song_info?id=&source=
///
/// Searches the platform by id and returns the first hit.
pub async fn get_song_info(
    State(state): State<AppState>,
    Query(params): Query<SongInfoParams>,
) -> ApiResult<Json<SongInfo>> {
    let id = required_param(params.id, "id")?;
    let platform = parse_source(params.source.as_deref())?;

    let song = state
        .catalog
        .search(&id, platform, 1, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound(format!("Song {} on {}", id, platform)))?;

    Ok(Json(SongInfo {
        id: song.id,
        name: song.name,
        artist: song.artist,
        album: song.album,
        lyricist: song.lyricist,
        composer: song.composer,
        duration: song.duration,
        platform_name: song.platform_name,
    }))
}
