//! StreamLite server binary.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use streamlite_core::{CatalogStore, InMemoryCatalog, PostgresCatalog};
use streamlite_server::{
    AppState, Config, ServeArgs, create_app,
    infra::logging::init_logging,
};
use tracing::{info, warn};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "streamlite-server")]
#[command(about = "Video catalog server with seekable byte-range streaming")]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads env fallbacks
    let env_loaded = dotenvy::dotenv().is_ok();
    let cli = Cli::parse();
    let config = Config::from_args(cli.serve);

    config
        .ensure_directories()
        .with_context(|| format!("failed to create {}", config.config_dir.display()))?;
    let _log_guard = init_logging(&config);

    if env_loaded {
        info!("loaded .env file");
    }
    if config.log_to_file {
        info!(path = %config.log_file_path().display(), "Logging to file");
    }

    let catalog = open_catalog(&config).await?;
    let state = AppState::new(catalog, config);

    if state.config().startup_scan {
        match state.refresh_catalog().await {
            Ok(report) => info!(
                added = report.added,
                updated = report.updated,
                removed = report.removed,
                "Initial scan complete"
            ),
            Err(e) => warn!(error = %e, "Initial video scan failed"),
        }
    }

    let host = state.config().server_host.clone();
    let port = state.config().server_port;
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))?;
    info!(
        addr = %listener.local_addr()?,
        video_dir = %state.config().video_dir.display(),
        "Starting StreamLite server"
    );

    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn open_catalog(config: &Config) -> anyhow::Result<Arc<dyn CatalogStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set, catalog is kept in memory only");
        return Ok(Arc::new(InMemoryCatalog::new()));
    };

    let catalog = PostgresCatalog::new(database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    catalog
        .initialize_schema()
        .await
        .context("failed to initialize catalog schema")?;
    info!("Database initialized successfully");

    Ok(Arc::new(catalog))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
