//! Storeflow API server

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use storeflow_api::auth::{RedisRevocationStore, RevocationStore};
use storeflow_api::{routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let bind_address = config.bind_address.clone();

    let pool = storeflow_shared::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("connecting to postgres")?;

    let redis = storeflow_shared::connect_redis(&config.redis_url)
        .await
        .context("connecting to redis")?;
    let revocations: Arc<dyn RevocationStore> = Arc::new(RedisRevocationStore::new(redis));

    let state = AppState::new(config, pool, revocations);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {bind_address}"))?;
    tracing::info!(addr = %bind_address, "storeflow api listening");

    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}
