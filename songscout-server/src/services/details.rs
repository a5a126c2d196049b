//! Song detail assembly for local and online songs

use serde::Serialize;

use songscout_common::db::NewAnalyzedSong;
use songscout_common::lyrics::{analyze_lyrics, LyricAnalysis};
use songscout_common::Platform;

use super::local_index::{IndexError, LocalIndex};
use super::{best_effort, MusicCatalog};

/// Cover size requested for detail views
pub const DETAIL_COVER_SIZE: u32 = 300;

const UNKNOWN_SONG: &str = "未知歌曲";
const UNKNOWN_ARTIST: &str = "未知歌手";

/// Full song view with lyric statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongDetail {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub lyricist: String,
    pub composer: String,
    pub source: String,
    pub platform_name: String,
    pub lyric: String,
    /// Translated lyric; online songs only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tlyric: Option<String>,
    /// Online songs only; empty when the cover lookup failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub analysis: LyricAnalysis,
}

/// Metadata the client already knows about an online song
///
/// Online platforms expose no per-id metadata lookup, so names travel with
/// the detail request.
#[derive(Debug, Clone, Default)]
pub struct SongHints {
    pub name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub lyricist: Option<String>,
    pub composer: Option<String>,
}

impl SongDetail {
    pub fn to_record(&self) -> NewAnalyzedSong {
        NewAnalyzedSong {
            song_id: self.id.clone(),
            source: self.source.clone(),
            name: self.name.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            lyricist: self.lyricist.clone(),
            composer: self.composer.clone(),
            platform_name: self.platform_name.clone(),
            analysis: self.analysis,
        }
    }
}

/// Detail for a local index document
pub async fn local_song_detail(index: &dyn LocalIndex, id: &str) -> Result<SongDetail, IndexError> {
    let doc = index.get(id).await?;
    let analysis = analyze_lyrics(&doc.geci);

    Ok(SongDetail {
        id: id.to_string(),
        name: doc.song,
        artist: doc.singer,
        album: doc.album,
        lyricist: doc.author,
        composer: doc.composer,
        source: Platform::Local.id().to_string(),
        platform_name: Platform::Local.display_name().to_string(),
        lyric: doc.geci,
        tlyric: None,
        cover_url: None,
        analysis,
    })
}

/// Detail for an online song; lyric and cover failures leave those fields empty
pub async fn online_song_detail(
    catalog: &dyn MusicCatalog,
    id: &str,
    platform: Platform,
    hints: SongHints,
) -> SongDetail {
    let lyrics = best_effort(catalog.lyrics(id, platform).await, "detail lyrics");
    let cover_url = best_effort(
        catalog.cover_url(id, platform, DETAIL_COVER_SIZE).await,
        "detail cover",
    );

    SongDetail {
        id: id.to_string(),
        name: hints.name.unwrap_or_else(|| UNKNOWN_SONG.to_string()),
        artist: hints.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album: hints.album.unwrap_or_default(),
        lyricist: hints.lyricist.unwrap_or_default(),
        composer: hints.composer.unwrap_or_default(),
        source: platform.id().to_string(),
        platform_name: platform.display_name().to_string(),
        analysis: analyze_lyrics(&lyrics.lyric),
        lyric: lyrics.lyric,
        tlyric: Some(lyrics.tlyric),
        cover_url: Some(cover_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::local_index::{IndexDocument, IndexField, IndexHit};
    use crate::services::CatalogError;
    use async_trait::async_trait;
    use songscout_common::models::Lyrics;
    use songscout_common::Song;

    struct OneDocIndex;

    #[async_trait]
    impl LocalIndex for OneDocIndex {
        async fn search_field(&self, _: IndexField, _: &str) -> Result<Vec<IndexHit>, IndexError> {
            Ok(Vec::new())
        }

        async fn get(&self, id: &str) -> Result<IndexDocument, IndexError> {
            if id != "42" {
                return Err(IndexError::NotFound(id.to_string()));
            }
            Ok(IndexDocument {
                song: "晴天".into(),
                singer: "周杰伦".into(),
                album: "叶惠美".into(),
                author: "周杰伦".into(),
                composer: "周杰伦".into(),
                geci: "故事的小黄花\n\n从出生那年就飘着".into(),
            })
        }
    }

    /// Catalog with lyrics but a broken cover endpoint
    struct LyricsOnlyCatalog;

    #[async_trait]
    impl MusicCatalog for LyricsOnlyCatalog {
        fn platforms(&self) -> &[Platform] {
            &Platform::ONLINE
        }

        async fn search(&self, _: &str, _: Platform, _: u32, _: u32) -> Result<Vec<Song>, CatalogError> {
            Ok(Vec::new())
        }

        async fn music_url(&self, _: &str, _: Platform, _: &str) -> Result<String, CatalogError> {
            Ok(String::new())
        }

        async fn lyrics(&self, _: &str, _: Platform) -> Result<Lyrics, CatalogError> {
            Ok(Lyrics {
                lyric: "[00:01.00]第一行\n[00:02.00]第二行".into(),
                tlyric: "first".into(),
            })
        }

        async fn cover_url(&self, _: &str, _: Platform, _: u32) -> Result<String, CatalogError> {
            Err(CatalogError::AllEndpointsFailed(3))
        }
    }

    #[tokio::test]
    async fn test_local_detail_from_document() {
        let detail = local_song_detail(&OneDocIndex, "42").await.unwrap();
        assert_eq!(detail.name, "晴天");
        assert_eq!(detail.source, "local");
        assert_eq!(detail.platform_name, "本地数据库");
        assert_eq!(detail.analysis.lyric_lines, 2);
        assert!(detail.analysis.has_lyrics);
        assert!(detail.tlyric.is_none());
    }

    #[tokio::test]
    async fn test_local_detail_missing_document() {
        let result = local_song_detail(&OneDocIndex, "7").await;
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_online_detail_defaults_and_cover_failure() {
        let detail =
            online_song_detail(&LyricsOnlyCatalog, "186016", Platform::Netease, SongHints::default()).await;

        assert_eq!(detail.name, "未知歌曲");
        assert_eq!(detail.artist, "未知歌手");
        assert_eq!(detail.platform_name, "网易云音乐");
        assert_eq!(detail.cover_url.as_deref(), Some(""));
        assert_eq!(detail.tlyric.as_deref(), Some("first"));
        assert_eq!(detail.analysis.lyric_lines, 2);
    }

    #[tokio::test]
    async fn test_online_detail_uses_hints() {
        let hints = SongHints {
            name: Some("晴天".into()),
            artist: Some("周杰伦".into()),
            album: Some("叶惠美".into()),
            ..Default::default()
        };
        let detail = online_song_detail(&LyricsOnlyCatalog, "186016", Platform::Qq, hints).await;
        let record = detail.to_record();

        assert_eq!(record.song_id, "186016");
        assert_eq!(record.source, "qq");
        assert_eq!(record.name, "晴天");
        assert_eq!(record.album, "叶惠美");
        assert_eq!(record.analysis, detail.analysis);
    }
}
