//! NetEase Cloud Music web search, used when the proxy has no NetEase results

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use songscout_common::config::FallbackConfig;
use songscout_common::{Platform, Song};

use super::upstream_json::{flexible_string, flexible_u64, join_artists};
use super::{CatalogError, FallbackSearch};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Option<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    #[serde(default)]
    songs: Option<Vec<NeteaseSong>>,
}

#[derive(Debug, Deserialize)]
struct NeteaseSong {
    #[serde(default, deserialize_with = "flexible_string")]
    id: String,
    #[serde(default, deserialize_with = "flexible_string")]
    name: String,
    #[serde(default)]
    artists: Option<Vec<Value>>,
    #[serde(default)]
    album: Option<NeteaseAlbum>,
    #[serde(default, deserialize_with = "flexible_u64")]
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NeteaseAlbum {
    #[serde(default, deserialize_with = "flexible_string")]
    name: String,
}

impl NeteaseSong {
    fn into_song(self) -> Song {
        let album = self.album.map(|a| a.name).unwrap_or_default();
        Song {
            duration: Some(self.duration.unwrap_or(0)),
            ..Song::new(self.id, self.name, join_artists(self.artists.as_deref().unwrap_or_default()), Platform::Netease)
                .with_album(album)
        }
    }
}

/// Direct client for `music.163.com/api/search/get/web`
pub struct NeteaseSearchClient {
    http_client: reqwest::Client,
    search_url: String,
}

impl NeteaseSearchClient {
    pub fn new(config: &FallbackConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static("https://music.163.com/"));

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            search_url: config.netease_search_url.clone(),
        })
    }
}

fn parse_search_response(body: SearchResponse, limit: usize) -> Vec<Song> {
    body.result
        .and_then(|r| r.songs)
        .unwrap_or_default()
        .into_iter()
        .take(limit)
        .map(NeteaseSong::into_song)
        .collect()
}

#[async_trait]
impl FallbackSearch for NeteaseSearchClient {
    fn platform(&self) -> Platform {
        Platform::Netease
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Song>, CatalogError> {
        let limit_param = limit.to_string();
        let params = [
            ("csrf_token", ""),
            ("s", query),
            ("type", "1"),
            ("offset", "0"),
            ("total", "true"),
            ("limit", limit_param.as_str()),
        ];

        let response = self
            .http_client
            .get(&self.search_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let songs = parse_search_response(body, limit);
        debug!(query, results = songs.len(), "NetEase fallback search complete");
        Ok(songs)
    }
}
