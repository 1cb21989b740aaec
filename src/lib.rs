//! Share one directory with devices on the local network.
//!
//! Browsing, downloads and uploads all go through [`resolve::resolve`], which
//! keeps every request inside the served root.

pub mod clients;
pub mod config;
pub mod content;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod netinfo;
pub mod qr;
pub mod resolve;
pub mod upload;
pub mod views;

use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use clients::ClientRegistry;
pub use config::Config;
pub use error::ShareError;

// --- State ---
pub type SharedState = Arc<AppState>;

pub struct AppState {
    /// Canonical directory being shared; fixed for the process lifetime.
    pub root_dir: PathBuf,
    /// Port the server listens on, for the connect URL.
    pub port: u16,
    pub config: Config,
    pub clients: ClientRegistry,
}

impl AppState {
    pub fn new(root_dir: PathBuf, port: u16, config: Config) -> SharedState {
        Arc::new(Self {
            root_dir,
            port,
            config,
            clients: ClientRegistry::new(),
        })
    }
}

/// Builds the full application router.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/files/*path", get(handlers::files_handler))
        .route("/download/:filename", get(handlers::download_handler))
        .route(
            "/upload",
            post(handlers::upload_handler)
                .layer(DefaultBodyLimit::max(state.config.max_upload_size)),
        )
        .route("/qrcode", get(handlers::qrcode_handler))
        .route("/active-users", get(handlers::active_users_handler))
        .route("/*path", get(handlers::browse_handler))
        .nest_service("/public", ServeDir::new(&state.config.assets_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            clients::track_clients,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
