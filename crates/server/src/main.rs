use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vibescout_core::{
    load_config, validate_config, CatalogApi, DiscoveryService, MediaSearchApi, MoodTable,
    ResponseCache, SqliteCache, TieredCache, TmdbCatalog, YouTubeMediaSearch,
};

use vibescout_server::api::create_router;
use vibescout_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("VIBESCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");

    // Shared cache tier is optional; without it only the in-process tier runs
    let shared: Option<Arc<dyn ResponseCache>> = match &config.cache.shared_path {
        Some(path) => {
            info!("Shared response cache at {:?}", path);
            Some(Arc::new(
                SqliteCache::new(path).context("Failed to open shared response cache")?,
            ))
        }
        None => {
            info!("No shared cache configured, using in-process cache only");
            None
        }
    };
    let cache: Arc<dyn ResponseCache> = Arc::new(TieredCache::new(shared));

    // Upstream clients
    let catalog: Arc<dyn CatalogApi> = Arc::new(
        TmdbCatalog::new(&config.tmdb, &config.cache, Arc::clone(&cache))
            .context("Failed to create catalog client")?,
    );
    info!("Catalog client initialized");

    let media: Arc<dyn MediaSearchApi> = Arc::new(
        YouTubeMediaSearch::new(&config.youtube, &config.cache, Arc::clone(&cache))
            .context("Failed to create media search client")?,
    );
    info!("Media search client initialized");

    // Mood table: builtin profiles plus config overrides
    let moods = MoodTable::with_overrides(&config.moods);
    info!("Mood table ready ({} moods)", moods.names().len());

    let discovery = Arc::new(DiscoveryService::new(
        Arc::clone(&catalog),
        media,
        moods,
        config.pipeline.clone(),
    ));

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), discovery, catalog));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
