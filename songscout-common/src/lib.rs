//! # songscout common library
//!
//! Shared code for the songscout service:
//! - Error type and result alias
//! - Configuration loading and root folder resolution
//! - SQLite initialization and the analyzed-songs repository
//! - Song, platform and lyric models
//! - Lyric analysis helpers

pub mod config;
pub mod db;
pub mod error;
pub mod lyrics;
pub mod models;

pub use error::{Error, Result};
pub use models::{Platform, Song};
