//! Music proxy passthrough
//!
//! GET /api mirrors the upstream `api.php` protocol so existing clients can
//! point at this service directly.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::parse_source;
use crate::error::{required_param, ApiError, ApiResult};
use crate::services::best_effort;
use crate::AppState;

pub const DEFAULT_SEARCH_COUNT: u32 = 20;
/// Bitrate code asking upstream for the best available quality
pub const DEFAULT_BITRATE: &str = "999";
pub const DEFAULT_COVER_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub types: Option<String>,
    pub source: Option<String>,
    pub name: Option<String>,
    pub count: Option<u32>,
    pub pages: Option<u32>,
    pub id: Option<String>,
    pub br: Option<String>,
    pub size: Option<u32>,
}

/// GET /api?types=search|url|lyric|pic
pub async fn proxy_passthrough(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> ApiResult<Response> {
    let platform = parse_source(params.source.as_deref())?;
    let catalog = state.catalog.as_ref();

    let response = match params.types.as_deref().unwrap_or_default() {
        "search" => {
            let name = required_param(params.name, "name")?;
            let count = params.count.unwrap_or(DEFAULT_SEARCH_COUNT);
            let page = params.pages.unwrap_or(1);
            let songs = best_effort(
                catalog.search(&name, platform, count, page).await,
                "proxy passthrough search",
            );
            Json(songs).into_response()
        }
        "url" => {
            let id = required_param(params.id, "id")?;
            let bitrate = params.br.unwrap_or_else(|| DEFAULT_BITRATE.to_string());
            let url = best_effort(
                catalog.music_url(&id, platform, &bitrate).await,
                "proxy passthrough url",
            );
            Json(json!({ "url": url })).into_response()
        }
        "lyric" => {
            let id = required_param(params.id, "id")?;
            let lyrics = best_effort(catalog.lyrics(&id, platform).await, "proxy passthrough lyric");
            Json(lyrics).into_response()
        }
        "pic" => {
            let id = required_param(params.id, "id")?;
            let size = params.size.unwrap_or(DEFAULT_COVER_SIZE);
            let url = best_effort(
                catalog.cover_url(&id, platform, size).await,
                "proxy passthrough pic",
            );
            Json(json!({ "url": url })).into_response()
        }
        other => {
            return Err(ApiError::BadRequest(format!("Unsupported API type: {:?}", other)));
        }
    };

    Ok(response)
}
