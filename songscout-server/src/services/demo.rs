//! Placeholder results for queries nothing else matched

use songscout_common::{Platform, Song};

/// Two fixed demo songs built around `query`, truncated to `limit`
pub fn demo_songs(query: &str, limit: usize) -> Vec<Song> {
    let featured = Song {
        pic_id: "mock_pic_1".to_string(),
        lyric_id: "mock_lyric_1".to_string(),
        lyricist: "优秀作词人".to_string(),
        composer: "才华作曲家".to_string(),
        duration: Some(240_000),
        ..Song::new(
            format!("mock_{}_1", query),
            format!("{} - 精选版", query),
            "知名歌手",
            Platform::Demo,
        )
        .with_album("热门专辑")
    };

    let single = Song {
        pic_id: "mock_pic_2".to_string(),
        lyric_id: "mock_lyric_2".to_string(),
        lyricist: "创意作词人".to_string(),
        composer: "新锐作曲家".to_string(),
        duration: Some(210_000),
        ..Song::new(
            format!("mock_{}_2", query),
            format!("关于{}的歌", query),
            "流行歌手",
            Platform::Demo,
        )
        .with_album("最新单曲")
    };

    vec![featured, single].into_iter().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_songs_embed_query() {
        let songs = demo_songs("夜曲", 5);
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, "mock_夜曲_1");
        assert_eq!(songs[0].name, "夜曲 - 精选版");
        assert_eq!(songs[1].name, "关于夜曲的歌");
        assert!(songs.iter().all(|s| s.source == "demo" && s.platform_name == "演示平台"));
    }

    #[test]
    fn test_demo_songs_truncate() {
        assert_eq!(demo_songs("x", 1).len(), 1);
    }
}
