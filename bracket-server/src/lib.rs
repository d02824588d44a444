//! Bracket Server - HTTP API for playing brackets
//!
//! This crate provides the web backend:
//! - REST API for tournaments and leaderboards
//! - Play sessions driving the bracket engine
//! - Tournament store acting as candidate source and stats sink
//! - Optional static file serving for a front-end

mod error;
mod routes;
mod state;
pub mod store;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub use error::ApiError;
pub use routes::sessions::STATS_NOT_SAVED_WARNING;
pub use state::{PlaySession, ServerState, DEFAULT_SESSION_IDLE_TIMEOUT};
pub use store::{
    CandidateSource, StatsSink, StoreError, StoredTournament, TournamentId, TournamentStore,
};

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// JSON file the tournament store is mirrored to (None = memory only)
    pub data_file: Option<PathBuf>,
    /// Directory of front-end files served for unmatched paths
    pub static_dir: Option<String>,
    /// Base seed for session shuffles (None = entropy)
    pub seed: Option<u64>,
    /// Play sessions idle this long are discarded
    pub session_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8003,
            data_file: None,
            static_dir: None,
            seed: None,
            session_idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let router = Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Tournaments API
        .route(
            "/api/tournaments",
            get(routes::tournaments::list_tournaments).post(routes::tournaments::create_tournament),
        )
        .route("/api/tournaments/:id", get(routes::tournaments::get_tournament))
        .route(
            "/api/tournaments/:id/leaderboard",
            get(routes::tournaments::get_leaderboard),
        )
        // Sessions API
        .route(
            "/api/tournaments/:id/sessions",
            post(routes::sessions::start_session),
        )
        .route(
            "/api/sessions/:id",
            get(routes::sessions::get_session).delete(routes::sessions::abandon_session),
        )
        .route("/api/sessions/:id/pick", post(routes::sessions::record_pick))
        // Shared state
        .with_state(state)
        .layer(CorsLayer::permissive());

    // Static file serving (must be last)
    match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Build the shared state described by `config`
pub fn create_state(config: &ServerConfig) -> anyhow::Result<Arc<ServerState>> {
    let store = match &config.data_file {
        Some(path) => TournamentStore::open(path)?,
        None => TournamentStore::in_memory(),
    };

    let mut state =
        ServerState::new(Arc::new(store)).with_session_idle_timeout(config.session_idle_timeout);
    if let Some(seed) = config.seed {
        state = state.with_shuffle_seed(seed);
    }
    Ok(Arc::new(state))
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = create_state(&config)?;
    let router = create_router(&config, state);

    tracing::info!("Bracket server starting on http://0.0.0.0:{}", config.port);
    match &config.data_file {
        Some(path) => tracing::info!("Tournament data file: {}", path.display()),
        None => tracing::info!("Tournament data kept in memory only"),
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
