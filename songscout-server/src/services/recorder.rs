//! Background recording of analyzed songs

use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use songscout_common::db::analyzed_songs::upsert_analyzed_song;
use songscout_common::db::NewAnalyzedSong;

/// Store `song` on a background task; the caller never waits for or sees the outcome
pub fn spawn_record(pool: SqlitePool, song: NewAnalyzedSong) -> JoinHandle<()> {
    tokio::spawn(async move {
        match upsert_analyzed_song(&pool, &song).await {
            Ok(record_id) => {
                debug!(record_id, song_id = %song.song_id, source = %song.source, "Recorded analyzed song");
            }
            Err(e) => {
                warn!(song_id = %song.song_id, source = %song.source, error = %e, "Failed to record analyzed song");
            }
        }
    })
}
