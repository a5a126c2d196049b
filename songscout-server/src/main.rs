//! songscout - aggregated music search service
//!
//! Searches a local song index first and tops up from online platforms
//! through a multi-endpoint music proxy. Also serves lyrics, lyric matching,
//! playback and cover links, and keeps a log of analyzed songs.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songscout_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use songscout_common::db::init_database;
use songscout_server::services::{
    ElasticsearchIndex, FallbackSearch, LocalIndex, MusicApiProxy, NeteaseSearchClient,
};
use songscout_server::{build_router, AppState};

/// Command-line arguments for songscout
#[derive(Parser, Debug)]
#[command(name = "songscout")]
#[command(about = "Aggregated music search service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config)
    #[arg(short, long, env = "SONGSCOUT_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(short, long, env = "SONGSCOUT_BIND")]
    bind: Option<String>,

    /// Root folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "SONGSCOUT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so its log level can seed the filter
    let (config, config_path) =
        TomlConfig::load_or_default(args.config.as_deref()).context("Failed to load config")?;

    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "songscout={level},songscout_server={level},songscout_common={level},tower_http={level}"
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting songscout v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_path {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => warn!("No config file found, using defaults"),
    }
    config.validate().context("Invalid configuration")?;

    let root_folder = RootFolderResolver::new(args.root_folder, &config).resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let catalog = Arc::new(MusicApiProxy::new(&config.proxy).context("Failed to build proxy client")?);
    info!(
        endpoints = config.proxy.endpoints.len(),
        primary = %catalog.current_endpoint(),
        "Music proxy ready"
    );

    let fallback: Arc<dyn FallbackSearch> = Arc::new(
        NeteaseSearchClient::new(&config.fallback).context("Failed to build fallback client")?,
    );

    let local_index: Option<Arc<dyn LocalIndex>> = if config.local_index.enabled {
        let url = config.local_index_url();
        let index = ElasticsearchIndex::new(&config.local_index, url.clone())
            .context("Failed to build local index client")?;
        match index.ping().await {
            Ok(()) => Some(Arc::new(index) as Arc<dyn LocalIndex>),
            Err(e) => {
                warn!(url = %url, error = %e, "Local index unreachable, continuing with online search only");
                None
            }
        }
    } else {
        info!("Local index disabled");
        None
    };

    let delete_password = config.delete_password();
    if delete_password.is_none() {
        info!("No delete password configured, analyzed-song deletion disabled");
    }

    let state = AppState::new(pool, catalog, Some(fallback), local_index, delete_password);
    let app = build_router(state);

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("songscout listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
