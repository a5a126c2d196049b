//! Analyzed-song log
//!
//! One row per (song_id, source). Re-analyzing a song replaces its row, so the
//! record id changes and the song moves to the top of the newest-first listing.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

use crate::lyrics::LyricAnalysis;
use crate::Result;

/// Stored analyzed-song row, shaped for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedSong {
    /// Table primary key, used for deletion
    pub record_id: i64,
    /// Song id on its source platform
    pub id: String,
    pub source: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub lyricist: String,
    pub composer: String,
    pub platform_name: String,
    /// RFC 3339 UTC timestamp
    pub analyzed_at: String,
    pub analysis: LyricAnalysis,
}

/// Values recorded when a song detail is analyzed
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalyzedSong {
    pub song_id: String,
    pub source: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub lyricist: String,
    pub composer: String,
    pub platform_name: String,
    pub analysis: LyricAnalysis,
}

/// One page of the newest-first listing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyzedSongsPage {
    pub songs: Vec<AnalyzedSong>,
    /// Row count of the whole table
    pub total: i64,
}

/// Insert or replace the row for (song_id, source), stamping it with the current time
///
/// Returns the record id of the stored row.
pub async fn upsert_analyzed_song(pool: &SqlitePool, song: &NewAnalyzedSong) -> Result<i64> {
    let analyzed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    let result = sqlx::query(
        r#"
        INSERT OR REPLACE INTO analyzed_songs (
            song_id, source, name, artist, album, lyricist, composer, platform_name,
            lyric_lines, word_count, has_lyrics, analyzed_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&song.song_id)
    .bind(&song.source)
    .bind(&song.name)
    .bind(&song.artist)
    .bind(&song.album)
    .bind(&song.lyricist)
    .bind(&song.composer)
    .bind(&song.platform_name)
    .bind(song.analysis.lyric_lines)
    .bind(song.analysis.word_count)
    .bind(song.analysis.has_lyrics)
    .bind(&analyzed_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Count all stored rows
pub async fn count_analyzed_songs(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analyzed_songs")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Load one page, newest first
pub async fn list_analyzed_songs(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<AnalyzedSongsPage> {
    let total = count_analyzed_songs(pool).await?;
    if total == 0 {
        return Ok(AnalyzedSongsPage::default());
    }

    let rows = sqlx::query(
        r#"
        SELECT id, song_id, source, name, artist, album, lyricist, composer,
               platform_name, analyzed_at, lyric_lines, word_count, has_lyrics
        FROM analyzed_songs
        ORDER BY analyzed_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let songs = rows.iter().map(row_to_analyzed_song).collect::<Result<Vec<_>>>()?;

    Ok(AnalyzedSongsPage { songs, total })
}

/// Delete rows by record id, returning how many were removed
pub async fn delete_analyzed_songs(pool: &SqlitePool, record_ids: &[i64]) -> Result<u64> {
    if record_ids.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM analyzed_songs WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in record_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

fn row_to_analyzed_song(row: &SqliteRow) -> Result<AnalyzedSong> {
    Ok(AnalyzedSong {
        record_id: row.try_get("id")?,
        id: row.try_get("song_id")?,
        source: row.try_get("source")?,
        name: row.try_get("name")?,
        artist: row.try_get("artist")?,
        album: row.try_get::<Option<String>, _>("album")?.unwrap_or_default(),
        lyricist: row.try_get::<Option<String>, _>("lyricist")?.unwrap_or_default(),
        composer: row.try_get::<Option<String>, _>("composer")?.unwrap_or_default(),
        platform_name: row.try_get::<Option<String>, _>("platform_name")?.unwrap_or_default(),
        analyzed_at: row.try_get("analyzed_at")?,
        analysis: LyricAnalysis {
            lyric_lines: row.try_get("lyric_lines")?,
            word_count: row.try_get("word_count")?,
            has_lyrics: row.try_get("has_lyrics")?,
        },
    })
}
