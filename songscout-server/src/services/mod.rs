//! Outbound clients and the search aggregation pipeline
//!
//! Upstream calls are best-effort: a failing platform contributes nothing to a
//! search, it never fails the request.

use async_trait::async_trait;
use songscout_common::models::Lyrics;
use songscout_common::{Platform, Song};
use thiserror::Error;

pub mod aggregator;
pub mod demo;
pub mod details;
pub mod local_index;
pub mod netease_fallback;
pub mod proxy_client;
pub mod recorder;
mod upstream_json;

pub use aggregator::{SearchAggregator, SearchOutcome, Suggestion};
pub use local_index::{ElasticsearchIndex, IndexDocument, IndexError, IndexField, IndexHit, LocalIndex};
pub use netease_fallback::NeteaseSearchClient;
pub use proxy_client::MusicApiProxy;

/// Errors from online music platforms
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-200 status
    #[error("API error: HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Every configured proxy endpoint was tried once and failed
    #[error("All {0} proxy endpoints failed")]
    AllEndpointsFailed(usize),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(Platform),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CatalogError::Parse(e.to_string())
        } else {
            CatalogError::Network(e.to_string())
        }
    }
}

/// Online catalog offering search, streaming links, lyrics and covers
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    /// Platforms this catalog can query, in preferred search order
    fn platforms(&self) -> &[Platform];

    async fn search(
        &self,
        query: &str,
        platform: Platform,
        count: u32,
        page: u32,
    ) -> Result<Vec<Song>, CatalogError>;

    /// Playback URL at the requested bitrate; empty when unavailable
    async fn music_url(
        &self,
        id: &str,
        platform: Platform,
        bitrate: &str,
    ) -> Result<String, CatalogError>;

    async fn lyrics(&self, lyric_id: &str, platform: Platform) -> Result<Lyrics, CatalogError>;

    /// Album cover URL at `size` pixels; empty when unavailable
    async fn cover_url(
        &self,
        pic_id: &str,
        platform: Platform,
        size: u32,
    ) -> Result<String, CatalogError>;
}

/// Platform-specific search used when the catalog returns nothing
#[async_trait]
pub trait FallbackSearch: Send + Sync {
    /// Platform whose empty results trigger this fallback
    fn platform(&self) -> Platform;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Song>, CatalogError>;
}

/// Unwrap an upstream result, logging and substituting the default on failure
pub(crate) fn best_effort<T, E>(result: Result<T, E>, operation: &str) -> T
where
    T: Default,
    E: std::fmt::Display,
{
    result.unwrap_or_else(|e| {
        tracing::warn!(operation, error = %e, "Upstream call failed, continuing without it");
        T::default()
    })
}
