//! HTTP API handlers for songscout

pub mod analyzed;
pub mod health;
pub mod lyrics;
pub mod media;
pub mod platforms;
pub mod proxy;
pub mod search;
pub mod songs;

pub use analyzed::{delete_analyzed, list_analyzed};
pub use health::health_routes;
pub use lyrics::{get_lyric_match, get_lyrics};
pub use media::{get_cover, get_play_url};
pub use platforms::list_platforms;
pub use proxy::proxy_passthrough;
pub use search::{search, suggest};
pub use songs::{get_song_detail, get_song_info};

use songscout_common::Platform;

use crate::error::ApiResult;

/// Platform named by a `source` query parameter, defaulting to NetEase
pub(crate) fn parse_source(source: Option<&str>) -> ApiResult<Platform> {
    match source.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Ok(s.parse()?),
        None => Ok(Platform::Netease),
    }
}
