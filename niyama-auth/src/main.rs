use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use niyama_auth::config::AuthConfig;
use niyama_auth::services::{AuthService, JwtService, PgCredentialStore, RedisCache};
use niyama_auth::{build_router, AppState};
use niyama_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    let config = AuthConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    init_tracing(&config.service_name, &config.log_level);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    let store = Arc::new(PgCredentialStore::new(pool));
    let cache = Arc::new(RedisCache::new(&config.redis_url).await?);
    let jwt = JwtService::new(&config.jwt);
    let auth_service = AuthService::new(
        store.clone(),
        cache.clone(),
        jwt,
        config.bcrypt_rounds,
    );

    let port = config.port;
    let state = AppState::new(config, store, cache, auth_service);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "niyama-auth listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
