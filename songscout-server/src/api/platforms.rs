//! Supported online platforms

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PlatformInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct PlatformsResponse {
    pub platforms: Vec<PlatformInfo>,
    pub count: usize,
}

/// GET /platforms
pub async fn list_platforms(State(state): State<AppState>) -> Json<PlatformsResponse> {
    let platforms: Vec<_> = state
        .catalog
        .platforms()
        .iter()
        .map(|p| PlatformInfo {
            id: p.id(),
            name: p.display_name(),
            available: true,
        })
        .collect();

    Json(PlatformsResponse {
        count: platforms.len(),
        platforms,
    })
}
