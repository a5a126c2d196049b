//! songscout server library
//!
//! HTTP service aggregating song search across a local index and online
//! music platforms, with lyric lookup, lyric matching and a log of analyzed
//! songs.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod pagination;
pub mod services;

use services::{FallbackSearch, LocalIndex, MusicCatalog, SearchAggregator};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Analyzed-songs database
    pub db: SqlitePool,
    pub catalog: Arc<dyn MusicCatalog>,
    /// None when no local index is configured or it was unreachable at startup
    pub local_index: Option<Arc<dyn LocalIndex>>,
    pub aggregator: Arc<SearchAggregator>,
    /// Password for deleting analyzed songs; None disables deletion
    pub delete_password: Option<String>,
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        catalog: Arc<dyn MusicCatalog>,
        fallback: Option<Arc<dyn FallbackSearch>>,
        local_index: Option<Arc<dyn LocalIndex>>,
        delete_password: Option<String>,
    ) -> Self {
        let aggregator = Arc::new(SearchAggregator::new(
            catalog.clone(),
            fallback,
            local_index.clone(),
        ));

        Self {
            db,
            catalog,
            local_index,
            aggregator,
            delete_password,
            startup_time: Instant::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api", get(api::proxy_passthrough))
        .route("/search", get(api::search))
        .route("/suggest", get(api::suggest))
        .route("/lyrics", get(api::get_lyrics))
        .route("/lyric_match", get(api::get_lyric_match))
        .route("/play_url", get(api::get_play_url))
        .route("/cover", get(api::get_cover))
        .route("/platforms", get(api::list_platforms))
        .route("/song_detail", get(api::get_song_detail))
        .route("/song_info", get(api::get_song_info))
        .route("/analyzed_songs", get(api::list_analyzed))
        .route("/delete_analyzed_songs", post(api::delete_analyzed))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
