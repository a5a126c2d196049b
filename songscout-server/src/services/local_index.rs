//! Local song index (Elasticsearch-compatible)
//!
//! Documents carry `song`, `singer`, `album`, `author` (lyricist), `composer`
//! and `geci` (lyric text). The index is optional: the service runs without
//! it and every local lookup then yields nothing.

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use songscout_common::config::LocalIndexConfig;
use songscout_common::{Platform, Song};

use super::upstream_json::flexible_string;

/// Hits requested per field query
const HITS_PER_QUERY: usize = 10;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index unreachable: {0}")]
    Network(String),

    #[error("Index error: HTTP {0}")]
    Status(u16),

    #[error("Index response parse error: {0}")]
    Parse(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid index URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for IndexError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            IndexError::Parse(e.to_string())
        } else {
            IndexError::Network(e.to_string())
        }
    }
}

/// Searchable document fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexField {
    Song,
    Singer,
    Lyric,
}

impl IndexField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexField::Song => "song",
            IndexField::Singer => "singer",
            IndexField::Lyric => "geci",
        }
    }
}

/// Stored song document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexDocument {
    #[serde(deserialize_with = "flexible_string")]
    pub song: String,
    #[serde(deserialize_with = "flexible_string")]
    pub singer: String,
    #[serde(deserialize_with = "flexible_string")]
    pub album: String,
    /// Lyricist
    #[serde(deserialize_with = "flexible_string")]
    pub author: String,
    #[serde(deserialize_with = "flexible_string")]
    pub composer: String,
    /// Lyric text
    #[serde(deserialize_with = "flexible_string")]
    pub geci: String,
}

impl IndexDocument {
    /// Convert to a search result; the document id doubles as lyric and picture id
    pub fn into_song(self, id: &str) -> Song {
        Song {
            lyricist: self.author,
            composer: self.composer,
            lyric_text: Some(self.geci),
            ..Song::new(id, self.song, self.singer, Platform::Local).with_album(self.album)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub id: String,
    pub document: IndexDocument,
}

#[async_trait]
pub trait LocalIndex: Send + Sync {
    /// Full-text match on one field, best hits first
    async fn search_field(&self, field: IndexField, query: &str) -> Result<Vec<IndexHit>, IndexError>;

    /// Fetch one document by id
    async fn get(&self, id: &str) -> Result<IndexDocument, IndexError>;
}

/// Look up `query` by song name, then singer, then lyric text
///
/// Later fields only fill the remaining slots, and ids already collected are
/// skipped. Index failures are logged and yield whatever was collected so far.
pub async fn search_local(index: &dyn LocalIndex, query: &str, limit: usize) -> Vec<Song> {
    let mut hits: Vec<IndexHit> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for field in [IndexField::Song, IndexField::Singer, IndexField::Lyric] {
        if hits.len() >= limit {
            break;
        }
        let remaining = limit - hits.len();

        let field_hits = match index.search_field(field, query).await {
            Ok(h) => h,
            Err(e) => {
                warn!(field = field.as_str(), error = %e, "Local index search failed");
                break;
            }
        };

        for hit in field_hits.into_iter().take(remaining) {
            if seen.insert(hit.id.clone()) {
                hits.push(hit);
            }
        }
    }

    debug!(query, results = hits.len(), "Local index search complete");
    hits.into_iter()
        .map(|hit| hit.document.into_song(&hit.id))
        .collect()
}

/// HTTP client for an Elasticsearch index
pub struct ElasticsearchIndex {
    http_client: reqwest::Client,
    base_url: Url,
    index: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: IndexDocument,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source", default)]
    source: Option<IndexDocument>,
}

impl ElasticsearchIndex {
    pub fn new(config: &LocalIndexConfig, base_url: impl Into<String>) -> Result<Self, IndexError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IndexError::Network(e.to_string()))?;

        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .map_err(|e| IndexError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            http_client,
            base_url,
            index: config.index.clone(),
        })
    }

    /// Index URL with `segments` appended, each percent-encoded as one path segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, IndexError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IndexError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&self.index)
            .extend(segments);
        Ok(url)
    }

    /// Check the cluster answers at all
    pub async fn ping(&self) -> Result<(), IndexError> {
        let response = self.http_client.get(self.base_url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(IndexError::Status(response.status().as_u16()));
        }
        info!(url = %self.base_url, index = %self.index, "Local index reachable");
        Ok(())
    }

    fn search_body(field: IndexField, query: &str) -> Value {
        json!({
            "size": HITS_PER_QUERY,
            "query": { "match": { field.as_str(): query } }
        })
    }
}

#[async_trait]
impl LocalIndex for ElasticsearchIndex {
    async fn search_field(&self, field: IndexField, query: &str) -> Result<Vec<IndexHit>, IndexError> {
        let url = self.endpoint(&["_search"])?;

        let response = self
            .http_client
            .post(url)
            .json(&Self::search_body(field, query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::Status(response.status().as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Parse(e.to_string()))?;

        Ok(body
            .hits
            .hits
            .into_iter()
            .map(|raw| IndexHit {
                id: raw.id,
                document: raw.source,
            })
            .collect())
    }

    async fn get(&self, id: &str) -> Result<IndexDocument, IndexError> {
        let url = self.endpoint(&["_doc", id])?;
        let response = self.http_client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IndexError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(IndexError::Status(response.status().as_u16()));
        }

        let body: GetResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Parse(e.to_string()))?;

        match body.source {
            Some(document) if body.found => Ok(document),
            _ => Err(IndexError::NotFound(id.to_string())),
        }
    }
}
