//! Redis connection management

use redis::aio::ConnectionManager;

/// Create a multiplexed Redis connection.
///
/// `ConnectionManager` reconnects on broken pipes and is cheap to clone, so
/// one instance is created per process and shared across request tasks.
pub async fn connect_redis(redis_url: &str) -> Result<ConnectionManager, redis::RedisError> {
    let client = redis::Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;
    tracing::info!("redis connection established");
    Ok(manager)
}
