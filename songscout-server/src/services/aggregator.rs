//! Multi-source search aggregation
//!
//! Local index first; online platforms only when the local index came up
//! short. Results are merged local-first, deduplicated on normalized
//! name + artist, and replaced by demo songs when nothing survives.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use songscout_common::{Platform, Song};

use super::demo::demo_songs;
use super::local_index::{search_local, LocalIndex};
use super::{best_effort, FallbackSearch, MusicCatalog};

/// Local hit count at which online platforms are skipped
pub const LOCAL_SUFFICIENT_THRESHOLD: usize = 5;
/// Songs requested from each online platform per search
pub const ONLINE_SEARCH_COUNT: u32 = 10;
pub const SUGGEST_LOCAL_LIMIT: usize = 3;
pub const SUGGEST_ONLINE_COUNT: u32 = 6;
pub const DEMO_RESULT_LIMIT: usize = 5;
pub const MAX_SEARCH_LIMIT: usize = 100;
/// Shortest query (in characters) that produces suggestions
pub const SUGGEST_MIN_QUERY_CHARS: usize = 2;

/// Aggregated search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub count: usize,
    /// Results gathered from all sources before deduplication
    pub total_found: usize,
    pub platforms_searched: usize,
    /// Result count per source id
    pub search_summary: BTreeMap<&'static str, usize>,
    pub local_count: usize,
    pub results: Vec<Song>,
}

/// Compact search hit for type-ahead
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub platform: Platform,
    pub platform_name: String,
    pub source: String,
    pub pic_id: String,
    pub lyric_id: String,
    pub lyricist: String,
    pub composer: String,
}

impl From<Song> for Suggestion {
    fn from(song: Song) -> Self {
        Self {
            id: song.id,
            name: song.name,
            artist: song.artist,
            album: song.album,
            platform: song.platform,
            platform_name: song.platform_name,
            source: song.source,
            pic_id: song.pic_id,
            lyric_id: song.lyric_id,
            lyricist: song.lyricist,
            composer: song.composer,
        }
    }
}

pub struct SearchAggregator {
    catalog: Arc<dyn MusicCatalog>,
    fallback: Option<Arc<dyn FallbackSearch>>,
    local: Option<Arc<dyn LocalIndex>>,
}

impl SearchAggregator {
    pub fn new(
        catalog: Arc<dyn MusicCatalog>,
        fallback: Option<Arc<dyn FallbackSearch>>,
        local: Option<Arc<dyn LocalIndex>>,
    ) -> Self {
        Self {
            catalog,
            fallback,
            local,
        }
    }

    async fn local_songs(&self, query: &str, limit: usize) -> Vec<Song> {
        match &self.local {
            Some(index) => search_local(index.as_ref(), query, limit).await,
            None => Vec::new(),
        }
    }

    /// Search one online platform, consulting the fallback when it returns nothing
    async fn online_songs(&self, query: &str, platform: Platform) -> Vec<Song> {
        let songs = best_effort(
            self.catalog
                .search(query, platform, ONLINE_SEARCH_COUNT, 1)
                .await,
            "proxy search",
        );
        if !songs.is_empty() {
            return songs;
        }

        match &self.fallback {
            Some(fallback) if fallback.platform() == platform => {
                debug!(%platform, query, "Proxy returned nothing, using fallback search");
                best_effort(
                    fallback.search(query, ONLINE_SEARCH_COUNT as usize).await,
                    "fallback search",
                )
            }
            _ => songs,
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> SearchOutcome {
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        let mut summary = BTreeMap::new();

        let local = self.local_songs(query, limit).await;
        let local_count = local.len();
        summary.insert(Platform::Local.id(), local_count);

        let mut gathered = local;
        if local_count < LOCAL_SUFFICIENT_THRESHOLD {
            for &platform in self.catalog.platforms() {
                let songs = self.online_songs(query, platform).await;
                summary.insert(platform.id(), songs.len());
                gathered.extend(songs);
            }
        }

        let total_found = gathered.len();
        let mut results = dedup_songs(gathered, limit);
        if results.is_empty() {
            debug!(query, "No results from any source, returning demo songs");
            results = demo_songs(query, DEMO_RESULT_LIMIT);
        }

        info!(
            query,
            local = local_count,
            total_found,
            returned = results.len(),
            "Search complete"
        );

        SearchOutcome {
            query: query.to_string(),
            count: results.len(),
            total_found,
            platforms_searched: summary.len(),
            search_summary: summary,
            local_count,
            results,
        }
    }

    /// Type-ahead suggestions; queries shorter than two characters yield nothing
    pub async fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let query = query.trim();
        if query.chars().count() < SUGGEST_MIN_QUERY_CHARS {
            return Vec::new();
        }
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);

        let mut gathered = self.local_songs(query, SUGGEST_LOCAL_LIMIT).await;
        if gathered.len() < limit {
            gathered.extend(best_effort(
                self.catalog
                    .search(query, Platform::Netease, SUGGEST_ONLINE_COUNT, 1)
                    .await,
                "suggestion search",
            ));
        }

        dedup_songs(gathered, limit)
            .into_iter()
            .map(Suggestion::from)
            .collect()
    }
}

/// Keep the first song per normalized name + artist, dropping nameless ones
pub fn dedup_songs(songs: Vec<Song>, limit: usize) -> Vec<Song> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for song in songs {
        if unique.len() >= limit {
            break;
        }
        let name = song.name.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        let key = format!("{}-{}", name, song.artist.trim().to_lowercase());
        if seen.insert(key) {
            unique.push(song);
        }
    }

    unique
}
