//! Song and platform models shared by the store and the service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::lyrics::LyricMatch;
use crate::Error;

/// Where a song record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// NetEase Cloud Music
    Netease,
    /// QQ Music
    Qq,
    /// Local search index
    Local,
    /// Placeholder results returned when nothing else matched
    Demo,
}

impl Platform {
    /// Platforms reachable through the online proxy, in search order
    pub const ONLINE: [Platform; 2] = [Platform::Netease, Platform::Qq];

    /// Wire identifier ("netease", "qq", ...)
    pub fn id(&self) -> &'static str {
        match self {
            Platform::Netease => "netease",
            Platform::Qq => "qq",
            Platform::Local => "local",
            Platform::Demo => "demo",
        }
    }

    /// Human-readable name shown to clients
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Netease => "网易云音乐",
            Platform::Qq => "QQ音乐",
            Platform::Local => "本地数据库",
            Platform::Demo => "演示平台",
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Platform::Netease | Platform::Qq)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "netease" => Ok(Platform::Netease),
            "qq" => Ok(Platform::Qq),
            "local" => Ok(Platform::Local),
            "demo" => Ok(Platform::Demo),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// A single search hit, normalized across every source
///
/// `artist` is always a flat string; upstream artist lists are joined
/// with `", "` before a `Song` is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub pic_id: String,
    #[serde(default)]
    pub lyric_id: String,
    /// Upstream source tag; usually equal to `platform`
    pub source: String,
    pub platform: Platform,
    pub platform_name: String,
    #[serde(default)]
    pub lyricist: String,
    #[serde(default)]
    pub composer: String,
    /// Duration as reported upstream (milliseconds for NetEase, seconds for QQ)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Full lyric text, only known for local index hits
    #[serde(skip)]
    pub lyric_text: Option<String>,
    /// Always empty in search responses; matches are loaded on demand
    #[serde(default)]
    pub lyric_matches: Vec<LyricMatch>,
    #[serde(default)]
    pub has_lyric_match: bool,
}

impl Song {
    /// Create a song whose picture and lyric ids default to the song id
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artist: impl Into<String>,
        platform: Platform,
    ) -> Self {
        let id = id.into();
        Self {
            pic_id: id.clone(),
            lyric_id: id.clone(),
            id,
            name: name.into(),
            artist: artist.into(),
            album: String::new(),
            source: platform.id().to_string(),
            platform,
            platform_name: platform.display_name().to_string(),
            lyricist: String::new(),
            composer: String::new(),
            duration: None,
            lyric_text: None,
            lyric_matches: Vec::new(),
            has_lyric_match: false,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }
}

/// Original and translated lyric text for one song
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lyrics {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lyric: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tlyric: String,
}

/// Upstream sends `null` for songs without a lyric or translation
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lyrics_null_fields_become_empty() {
        let lyrics: Lyrics =
            serde_json::from_str(r#"{"lyric": "[00:01.00]故事的小黄花", "tlyric": null}"#).unwrap();
        assert_eq!(lyrics.lyric, "[00:01.00]故事的小黄花");
        assert_eq!(lyrics.tlyric, "");

        let lyrics: Lyrics = serde_json::from_str(r#"{"lyric": null}"#).unwrap();
        assert_eq!(lyrics, Lyrics::default());
    }

    #[test]
    fn test_platform_round_trips_through_id() {
        for platform in [Platform::Netease, Platform::Qq, Platform::Local, Platform::Demo] {
            assert_eq!(platform.id().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_platform_parse_is_case_insensitive() {
        assert_eq!(" NetEase ".parse::<Platform>().unwrap(), Platform::Netease);
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let err = "kugou".parse::<Platform>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(ref p) if p == "kugou"));
    }

    #[test]
    fn test_only_proxy_platforms_are_online() {
        assert!(Platform::Netease.is_online());
        assert!(Platform::Qq.is_online());
        assert!(!Platform::Local.is_online());
        assert!(!Platform::Demo.is_online());
    }

    #[test]
    fn test_song_serialization_hides_lyric_text() {
        let mut song = Song::new("42", "晴天", "周杰伦", Platform::Local).with_album("叶惠美");
        song.lyric_text = Some("故事的小黄花".to_string());

        let value = serde_json::to_value(&song).unwrap();
        assert_eq!(value["platform"], "local");
        assert_eq!(value["platform_name"], "本地数据库");
        assert_eq!(value["pic_id"], "42");
        assert_eq!(value["album"], "叶惠美");
        assert!(value.get("lyric_text").is_none());
        assert!(value.get("duration").is_none());
        assert_eq!(value["has_lyric_match"], false);
    }
}
