//! # Betony API Server
//!
//! Serves registration, login and account endpoints for the Betony
//! social-posting backend.
//!
//! ## Startup
//!
//! 1. Load and validate configuration (fails fast on a missing or weak
//!    `SECRET_KEY`)
//! 2. Open the SQLite pool and apply migrations
//! 3. Make sure the default role exists
//! 4. Serve until Ctrl+C, then drain and close the pool
//!
//! ## Usage
//!
//! ```bash
//! SECRET_KEY=$(openssl rand -hex 32) cargo run -p betony-api
//! ```

use anyhow::Context;
use betony_api::{
    app::{build_router, AppState},
    config::Config,
};
use betony_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "betony_api=debug,betony_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Betony API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to open database")?;

    run_migrations(&pool).await.context("Failed to apply migrations")?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config)?;

    let role = state.identity.ensure_default_role().await?;
    tracing::info!(role_id = role.id, role = %role.name, "Default role ready");

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
