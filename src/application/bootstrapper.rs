//! Application bootstrapper
//!
//! Handles all initialization and setup for the medcase backend.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::CONFIG;
use crate::db;
use crate::endpoints;
use crate::repositories::TokenRepository;
use crate::services::activity::ActivityService;
use crate::services::bootstrap;
use crate::services::notify::NotifyService;
use crate::state::AppState;

/// Bootstrap and run the application
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting medcase backend v{}", env!("CARGO_PKG_VERSION"));

    let state = init_services().await?;

    start_token_purger(state.clone());

    let app = create_app(state);

    serve(app).await
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("medcase={}", CONFIG.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();
}

/// Initialize all application services
async fn init_services() -> anyhow::Result<AppState> {
    let conn = db::connect().await?;
    tracing::info!("Database connection established");

    let activity = ActivityService::new();
    let notify = NotifyService::new();
    activity.set_db(conn.clone()).await;
    notify.set_db(conn.clone()).await;

    // Seed the first admin account on an empty database
    if let Some(admin) = bootstrap::ensure_admin(&conn).await? {
        tracing::info!("Bootstrap admin created: {}", admin.email);
    }

    Ok(AppState::new(conn, activity, notify))
}

/// Periodically drop expired and blacklisted refresh tokens.
fn start_token_purger(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match TokenRepository::new(state.db.clone()).purge_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Purged {} expired auth tokens", n),
                Err(e) => tracing::warn!("Token purge failed: {}", e),
            }
        }
    });
}

/// Create the main application router
fn create_app(state: AppState) -> Router {
    let cors = if CONFIG.server.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = CONFIG
            .server
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the HTTP server
async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", CONFIG.server.host, CONFIG.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
