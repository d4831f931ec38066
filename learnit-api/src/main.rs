//! # LearnIt API Server
//!
//! Serves the LearnIt HTTP API: account registration and login, and
//! per-user CRUD over learning posts, backed by PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/learnit \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p learnit-api
//! ```

use anyhow::Context;
use chrono::Duration;
use learnit_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use learnit_shared::{
    auth::authenticator::Authenticator,
    db::{migrations::run_migrations, pool},
    store::PgStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "learnit_api=debug,learnit_shared=info,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    tracing::info!("LearnIt API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let db = pool::create_pool(config.database.clone())
        .await
        .context("Failed to connect to database")?;
    run_migrations(&db).await.context("Failed to run migrations")?;

    let authenticator = Authenticator::new(
        config.jwt.secret.clone(),
        Duration::seconds(config.jwt.expiration_seconds),
        config.password,
    )
    .context("Invalid password hashing parameters")?;

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(db.clone())), authenticator, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool::close_pool(&db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
