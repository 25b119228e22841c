use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use agrobagual_api::config;
use agrobagual_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use agrobagual_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agrobagual_api=info,tower_http=info")),
        )
        .init();

    let config = config::config().clone();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting AgroBagual API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            Arc::new(MemoryStore::new())
        }
    };

    let port = config.api.port;
    let router = app(AppState::new(store, config));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("AgroBagual API listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
