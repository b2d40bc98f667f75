mod config;
mod dashboards;
mod db;
mod errors;
mod layout;
mod models;
mod persist;
mod routes;
mod state;
mod widgets;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Breeze API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite (runs pending migrations)
    let db = create_pool(&config.database_url).await?;
    info!("Database ready at {}", config.database_url);

    let state = AppState::new(db, &config);
    info!(
        "Grid {}x{}, layout writes debounced by {:?}",
        state.grid.cols,
        state.grid.max_rows,
        state.layout_writer.delay()
    );

    // Build router
    let app = build_router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the desktop shell has a fixed one

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Nothing debounced may be lost on exit.
    let pending = state.layout_writer.pending_count();
    let written = state.layout_writer.flush_all().await;
    info!("Flushed {written}/{pending} pending layouts, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
