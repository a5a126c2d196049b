//! Multi-endpoint music proxy API client
//!
//! All endpoints speak the same `api.php?types=...` protocol. Requests go to
//! the current endpoint; on any failure the client advances to the next one
//! and retries, visiting each endpoint at most once per call. The endpoint
//! that last succeeded stays current for later calls.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use songscout_common::config::ProxyConfig;
use songscout_common::models::Lyrics;
use songscout_common::{Platform, Song};

use super::upstream_json::{artist_names, flexible_string, flexible_u64, optional_flexible_string};
use super::{CatalogError, MusicCatalog};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Song entry as returned by `types=search`
#[derive(Debug, Deserialize)]
struct ProxySong {
    #[serde(default, deserialize_with = "flexible_string")]
    id: String,
    #[serde(default, deserialize_with = "flexible_string")]
    name: String,
    #[serde(default, deserialize_with = "artist_names")]
    artist: String,
    #[serde(default, deserialize_with = "flexible_string")]
    album: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pic_id: String,
    #[serde(default, deserialize_with = "flexible_string")]
    lyric_id: String,
    #[serde(default, deserialize_with = "optional_flexible_string")]
    source: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    lyricist: String,
    #[serde(default, deserialize_with = "flexible_string")]
    composer: String,
    #[serde(default, deserialize_with = "flexible_u64")]
    duration: Option<u64>,
}

impl ProxySong {
    fn into_song(self, platform: Platform) -> Song {
        Song {
            source: self.source.unwrap_or_else(|| platform.id().to_string()),
            pic_id: self.pic_id,
            lyric_id: self.lyric_id,
            album: self.album,
            lyricist: self.lyricist,
            composer: self.composer,
            duration: self.duration,
            ..Song::new(self.id, self.name, self.artist, platform)
        }
    }
}

/// Client for the music proxy API with endpoint failover
pub struct MusicApiProxy {
    http_client: reqwest::Client,
    endpoints: Vec<String>,
    current: AtomicUsize,
}

impl MusicApiProxy {
    pub fn new(config: &ProxyConfig) -> Result<Self, CatalogError> {
        if config.endpoints.is_empty() {
            return Err(CatalogError::AllEndpointsFailed(0));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://music.gdstudio.xyz"));
        headers.insert(REFERER, HeaderValue::from_static("https://music.gdstudio.xyz/"));

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoints: config.endpoints.clone(),
            current: AtomicUsize::new(0),
        })
    }

    /// Endpoint the next request will try first
    pub fn current_endpoint(&self) -> &str {
        &self.endpoints[self.current.load(Ordering::Relaxed) % self.endpoints.len()]
    }

    /// Send `params` to the current endpoint, rotating through the rest on failure
    async fn request(&self, params: &[(&str, String)]) -> Result<Value, CatalogError> {
        let total = self.endpoints.len();

        for _ in 0..total {
            let index = self.current.load(Ordering::Relaxed) % total;
            let endpoint = &self.endpoints[index];

            match self.request_endpoint(endpoint, params).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Proxy endpoint failed, switching to next");
                    // Another request may already have rotated past this endpoint
                    let _ = self.current.compare_exchange(
                        index,
                        (index + 1) % total,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    );
                }
            }
        }

        Err(CatalogError::AllEndpointsFailed(total))
    }

    async fn request_endpoint(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, CatalogError> {
        debug!(endpoint = %endpoint, ?params, "Querying music proxy");

        let response = self.http_client.get(endpoint).query(params).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(CatalogError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    fn ensure_online(platform: Platform) -> Result<(), CatalogError> {
        if platform.is_online() {
            Ok(())
        } else {
            Err(CatalogError::UnsupportedPlatform(platform))
        }
    }
}

/// `{"url": "..."}` → url, anything else → ""
fn url_field(value: &Value) -> String {
    value
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Map a `types=search` body to songs; non-array bodies yield nothing
fn parse_search_results(value: Value, platform: Platform) -> Vec<Song> {
    let Value::Array(items) = value else {
        debug!(%platform, "Proxy search returned a non-array body");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ProxySong>(item) {
            Ok(song) => Some(song.into_song(platform)),
            Err(e) => {
                debug!(error = %e, "Skipping malformed proxy search entry");
                None
            }
        })
        .collect()
}

#[async_trait]
impl MusicCatalog for MusicApiProxy {
    fn platforms(&self) -> &[Platform] {
        &Platform::ONLINE
    }

    async fn search(
        &self,
        query: &str,
        platform: Platform,
        count: u32,
        page: u32,
    ) -> Result<Vec<Song>, CatalogError> {
        Self::ensure_online(platform)?;

        let params = [
            ("types", "search".to_string()),
            ("source", platform.id().to_string()),
            ("name", query.to_string()),
            ("count", count.to_string()),
            ("pages", page.to_string()),
        ];

        let songs = parse_search_results(self.request(&params).await?, platform);
        debug!(%platform, query, results = songs.len(), "Proxy search complete");
        Ok(songs)
    }

    async fn music_url(
        &self,
        id: &str,
        platform: Platform,
        bitrate: &str,
    ) -> Result<String, CatalogError> {
        Self::ensure_online(platform)?;

        let params = [
            ("types", "url".to_string()),
            ("source", platform.id().to_string()),
            ("id", id.to_string()),
            ("br", bitrate.to_string()),
        ];
        Ok(url_field(&self.request(&params).await?))
    }

    async fn lyrics(&self, lyric_id: &str, platform: Platform) -> Result<Lyrics, CatalogError> {
        Self::ensure_online(platform)?;

        let params = [
            ("types", "lyric".to_string()),
            ("source", platform.id().to_string()),
            ("id", lyric_id.to_string()),
        ];

        let value = self.request(&params).await?;
        if !value.is_object() {
            return Ok(Lyrics::default());
        }
        serde_json::from_value(value).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    async fn cover_url(
        &self,
        pic_id: &str,
        platform: Platform,
        size: u32,
    ) -> Result<String, CatalogError> {
        Self::ensure_online(platform)?;

        let params = [
            ("types", "pic".to_string()),
            ("source", platform.id().to_string()),
            ("id", pic_id.to_string()),
            ("size", size.to_string()),
        ];
        Ok(url_field(&self.request(&params).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_search_results_normalizes_fields() {
        let body = json!([
            {
                "id": 186016,
                "name": "晴天",
                "artist": ["周杰伦"],
                "album": "叶惠美",
                "pic_id": "109951163200249252",
                "lyric_id": 186016,
                "source": "netease"
            },
            {
                "id": "0039MnYb0qxYhV",
                "name": "稻香",
                "artist": "周杰伦",
                "duration": "223"
            }
        ]);

        let songs = parse_search_results(body, Platform::Qq);
        assert_eq!(songs.len(), 2);

        assert_eq!(songs[0].id, "186016");
        assert_eq!(songs[0].lyric_id, "186016");
        assert_eq!(songs[0].artist, "周杰伦");
        assert_eq!(songs[0].source, "netease");
        assert_eq!(songs[0].platform, Platform::Qq);
        assert_eq!(songs[0].platform_name, "QQ音乐");

        // Missing source falls back to the queried platform
        assert_eq!(songs[1].source, "qq");
        assert_eq!(songs[1].duration, Some(223));
        assert_eq!(songs[1].pic_id, "");
    }

    #[test]
    fn test_parse_search_results_rejects_non_array() {
        assert!(parse_search_results(json!({"error": "busy"}), Platform::Netease).is_empty());
        assert!(parse_search_results(Value::Null, Platform::Netease).is_empty());
    }

    #[test]
    fn test_parse_search_results_skips_non_objects() {
        let songs = parse_search_results(json!(["junk", {"id": 1, "name": "ok"}]), Platform::Netease);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].name, "ok");
    }

    #[test]
    fn test_url_field() {
        assert_eq!(url_field(&json!({"url": "http://x/y.mp3", "br": 320})), "http://x/y.mp3");
        assert_eq!(url_field(&json!({"url": null})), "");
        assert_eq!(url_field(&json!([])), "");
    }

    #[test]
    fn test_new_requires_endpoints() {
        let config = ProxyConfig {
            endpoints: vec![],
            timeout_secs: 1,
        };
        assert!(MusicApiProxy::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_local_platform_is_rejected_without_network() {
        let proxy = MusicApiProxy::new(&ProxyConfig::default()).unwrap();
        let result = proxy.search("x", Platform::Local, 1, 1).await;
        assert!(matches!(result, Err(CatalogError::UnsupportedPlatform(Platform::Local))));
    }
}
