use std::sync::Arc;

use foodgram_api::app::{router, AppState};
use foodgram_api::config;
use foodgram_api::database::{DatabaseManager, PgRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram_api=info,tower_http=info".into()),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting Foodgram API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    let store = Arc::new(PgRepository::new(pool));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let app = router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Foodgram API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
