//! Lyric lookup and in-lyric text matching

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use songscout_common::lyrics::{find_lyric_matches, LyricMatch};
use songscout_common::models::Lyrics;
use songscout_common::Platform;

use super::parse_source;
use crate::error::{required_param, ApiResult};
use crate::services::best_effort;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LyricParams {
    pub id: Option<String>,
    pub source: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LyricMatchResponse {
    pub lyric_id: String,
    pub source: Platform,
    pub query: String,
    pub matches: Vec<LyricMatch>,
    pub has_match: bool,
    pub full_lyric: String,
}

/// Lyrics for `id` on `platform`; local songs read the index's lyric field
///
/// Lookup failures yield empty lyrics.
pub(crate) async fn load_lyrics(state: &AppState, id: &str, platform: Platform) -> Lyrics {
    if platform != Platform::Local {
        return best_effort(state.catalog.lyrics(id, platform).await, "lyrics");
    }

    let Some(index) = &state.local_index else {
        return Lyrics::default();
    };

    match index.get(id).await {
        Ok(doc) => Lyrics {
            lyric: doc.geci,
            tlyric: String::new(),
        },
        Err(e) => {
            warn!(id, error = %e, "Local lyric lookup failed");
            Lyrics::default()
        }
    }
}

/// GET /lyrics?id=&source=
pub async fn get_lyrics(
    State(state): State<AppState>,
    Query(params): Query<LyricParams>,
) -> ApiResult<Json<Lyrics>> {
    let id = required_param(params.id, "id")?;
    let platform = parse_source(params.source.as_deref())?;

    Ok(Json(load_lyrics(&state, &id, platform).await))
}

/// GET /lyric_match?id=&source=&q=
pub async fn get_lyric_match(
    State(state): State<AppState>,
    Query(params): Query<LyricParams>,
) -> ApiResult<Json<LyricMatchResponse>> {
    let id = required_param(params.id, "id")?;
    let query = required_param(params.q, "q")?;
    let platform = parse_source(params.source.as_deref())?;

    let lyric = load_lyrics(&state, &id, platform).await.lyric;
    let matches = find_lyric_matches(&lyric, &query);

    Ok(Json(LyricMatchResponse {
        lyric_id: id,
        source: platform,
        query,
        has_match: !matches.is_empty(),
        matches,
        full_lyric: lyric,
    }))
}
