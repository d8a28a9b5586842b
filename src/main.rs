use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use gamedb_api::auth::TokenService;
use gamedb_api::config::AppConfig;
use gamedb_api::store::{DocumentStore, MemStore, PgStore};
use gamedb_api::{app, resource, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.context("connecting to store")?;
            store
                .init_collections(&resource::collections())
                .await
                .context("initializing collections")?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store (data is not persisted)");
            Arc::new(MemStore::new())
        }
    };

    let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiry_hours)
        .context("JWT_SECRET must be set")?;

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let state = AppState {
        config: Arc::new(config),
        store,
        tokens,
        http: reqwest::Client::new(),
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("GameDB API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}
