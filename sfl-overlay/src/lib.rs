//! sfl-overlay library
//!
//! Local HTTP service for the SF6 Live overlay: receives scraped player data,
//! feeds the rating into the session engine and refreshes OBS artifacts.

use axum::Router;
use sfl_common::EventBus;
use sfl_session::{JsonFileStore, MemoryStore, SessionEngine, SessionStore, SqliteStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod output;

use config::StoreBackend;
use output::OverlayOutput;

/// Latest raw payload, served at `/data.json`
pub const PLAYER_DATA_FILE: &str = "player_data.json";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SessionEngine>,
    pub events: EventBus,
    pub output: Arc<OverlayOutput>,
    pub root_folder: PathBuf,
}

impl AppState {
    pub fn new(engine: Arc<SessionEngine>, output: Arc<OverlayOutput>, root_folder: PathBuf) -> Self {
        Self {
            engine,
            events: EventBus::default(),
            output,
            root_folder,
        }
    }

    pub fn player_data_path(&self) -> PathBuf {
        self.root_folder.join(PLAYER_DATA_FILE)
    }
}

/// Open the configured session store under `root`
pub async fn open_store(
    backend: StoreBackend,
    root: &Path,
) -> sfl_common::Result<Arc<dyn SessionStore>> {
    Ok(match backend {
        StoreBackend::Json => Arc::new(JsonFileStore::in_root(root)),
        StoreBackend::Sqlite => Arc::new(
            SqliteStore::open(&root.join(sfl_session::store::sqlite::SESSION_DB_NAME)).await?,
        ),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    })
}

/// Build application router
///
/// API routes first; anything else is served from the root folder.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let static_files = ServeDir::new(&state.root_folder).append_index_html_on_directories(true);

    Router::new()
        .route("/receiver", post(api::receive_player_data))
        .route("/data.json", get(api::get_player_data))
        .route("/api/session", get(api::get_session))
        .route("/api/session/end", post(api::end_session))
        .route("/api/session/reset", post(api::reset_session))
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .fallback_service(static_files)
        .with_state(state)
        // The userscript posts from the scraped page's origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
