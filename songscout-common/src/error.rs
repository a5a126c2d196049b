//! Error types shared across songscout crates

use thiserror::Error;

/// Result alias used by the common library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by storage, configuration and model parsing
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML file present but unreadable as songscout config
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be resolved or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform id not known to the service (e.g. "spotify")
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied a bad value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
