//! sfl-overlay - SF6 Live overlay server
//!
//! Receives scraped player data from the browser userscript, tracks the
//! rating session and writes OBS text fields and the MR chart.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sfl_common::config::{
    default_config_file, ensure_directory_exists, resolve_root_folder, ROOT_FOLDER_ENV,
};
use sfl_session::SessionEngine;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sfl_overlay::config::{OverlayConfig, StoreBackend};
use sfl_overlay::output::OverlayOutput;
use sfl_overlay::{build_router, open_store, AppState};

/// Command-line arguments for sfl-overlay
#[derive(Parser, Debug)]
#[command(name = "sfl-overlay")]
#[command(about = "SF6 Live overlay server")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "SFL_PORT")]
    port: Option<u16>,

    /// Root folder for session data, static files and OBS output
    #[arg(short, long, env = ROOT_FOLDER_ENV)]
    root_folder: Option<PathBuf>,

    /// Session store backend (overrides config file)
    #[arg(long, env = "SFL_STORE", value_enum)]
    store: Option<StoreBackend>,

    /// Path of the TOML config file
    #[arg(short, long, env = "SFL_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sfl_overlay=info,sfl_session=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting SF6 Live overlay (sfl-overlay) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_file);
    let config = match &config_path {
        Some(path) => OverlayConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => OverlayConfig::default(),
    }
    .with_overrides(args.port, args.store);

    let root_folder = resolve_root_folder(
        args.root_folder.as_deref(),
        ROOT_FOLDER_ENV,
        config_path.as_deref(),
    );
    ensure_directory_exists(&root_folder).context("Failed to create root folder")?;
    info!("Root folder: {}", root_folder.display());

    let store = open_store(config.store, &root_folder)
        .await
        .context("Failed to open session store")?;
    let engine = Arc::new(SessionEngine::new(store));
    info!("Session store: {}", engine.store_name());

    let output = Arc::new(OverlayOutput::new(&root_folder, config.chart_settings()));
    output.prepare().context("Failed to prepare OBS output directory")?;
    info!("OBS output: {}", output.output_dir().display());

    // Regenerate the chart from a stored session without delaying startup
    {
        let output = Arc::clone(&output);
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let session = engine.current().await;
            output.restore(session.as_ref()).await;
        });
    }

    let state = AppState::new(engine, output, root_folder);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("sfl-overlay listening on http://{}", addr);
    info!("Userscript endpoint: http://{}/receiver", addr);

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
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
