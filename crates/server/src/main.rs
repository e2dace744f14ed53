mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plugsync_core::{
    hydrate_installed_versions, load_config, validate_config, CatalogClient, CatalogSync,
    DirectoryClient, DirectorySync, Event, EventBus, FsLocalPlugins, HttpCatalogClient,
    HttpDirectoryClient, LocalPlugins, SeenVersions, Slot, SnapshotStore, SqliteSeenVersions,
    SqliteSnapshotStore, UpdateChecker,
};

use api::create_router;
use state::AppState;

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
    let config_path = std::env::var("PLUGSYNC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let mut config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Tracking {} catalog products", config.catalog.products.len());

    // Local plugin inspection
    let local: Arc<dyn LocalPlugins> =
        Arc::new(FsLocalPlugins::new(config.host.plugins_dir.clone()));

    // Products without a configured version pick it up from disk
    hydrate_installed_versions(&mut config.catalog.products, local.as_ref());

    // Durable snapshot store
    let store: Arc<dyn SnapshotStore> = Arc::new(
        SqliteSnapshotStore::new(&config.database.path)
            .context("Failed to create snapshot store")?,
    );
    info!("Snapshot store initialized");

    // Event bus: plugin updates flush both cache slots
    let events = Arc::new(EventBus::new());
    let store_for_events = Arc::clone(&store);
    events.subscribe(move |event| {
        if matches!(event, Event::PluginsUpdated) {
            info!("Plugins updated, invalidating catalog snapshots");
            for slot in [Slot::Primary, Slot::Recommended] {
                if let Err(e) = store_for_events.invalidate(slot) {
                    warn!(slot = %slot, error = %e, "Failed to invalidate slot");
                }
            }
        }
    });

    // Detect plugins installed or updated since the last run
    let seen: Arc<dyn SeenVersions> = Arc::new(
        SqliteSeenVersions::new(&config.database.path).context("Failed to create version ledger")?,
    );
    let checker = UpdateChecker::new(seen, Arc::clone(&events), config.host.plugin_prefix.clone());
    match checker.run(local.as_ref()) {
        Ok(updated) if !updated.is_empty() => {
            info!("Found {} new or updated plugins", updated.len());
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Update check failed"),
    }

    // Remote catalog client and sync service
    let catalog_client: Arc<dyn CatalogClient> = Arc::new(
        HttpCatalogClient::new(&config.catalog.api_base, config.catalog.timeout_secs)
            .context("Failed to create catalog client")?,
    );
    let catalog_sync = CatalogSync::new(
        catalog_client,
        Arc::clone(&store),
        config.catalog.clone(),
    )
    .with_events(Arc::clone(&events));
    info!("Catalog sync initialized for {}", config.catalog.api_base);

    // Secondary recommendation source, when configured
    let directory_sync = match &config.directory {
        Some(directory_config) => {
            let directory_client: Arc<dyn DirectoryClient> = Arc::new(
                HttpDirectoryClient::new(&directory_config.base_url, directory_config.timeout_secs)
                    .context("Failed to create directory client")?,
            );
            info!("Directory sync initialized for {}", directory_config.base_url);
            Some(DirectorySync::new(
                directory_client,
                Arc::clone(&store),
                directory_config.clone(),
            ))
        }
        None => {
            info!("No plugin directory configured");
            None
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        catalog_sync,
        directory_sync,
        local,
        events,
    ));

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

    info!("Server shutting down");

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
