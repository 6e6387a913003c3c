//! Redis adapter for the content cache.

use std::sync::Arc;

use async_trait::async_trait;
use deadpool_redis::{
    Pool, PoolConfig, Runtime, Timeouts,
    redis::{self, AsyncCommands, aio::ConnectionLike},
};
use tracing::{info, warn};

use crate::cache::{CacheConfig, CacheStore, RemoteCache, RemoteCacheError};

/// Remote cache backed by a pooled Redis connection.
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, RemoteCacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| RemoteCacheError::Unavailable(err.to_string()))
    }
}

fn command_error(err: redis::RedisError) -> RemoteCacheError {
    if err.is_io_error() || err.is_timeout() || err.is_connection_dropped() {
        RemoteCacheError::Unavailable(err.to_string())
    } else {
        RemoteCacheError::Command(err.to_string())
    }
}

#[async_trait]
impl RemoteCache for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RemoteCacheError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(command_error)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), RemoteCacheError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(command_error)
    }

    async fn del(&self, key: &str) -> Result<(), RemoteCacheError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await.map_err(command_error)
    }

    async fn flush(&self) -> Result<(), RemoteCacheError> {
        let mut conn = self.connection().await?;
        conn.req_packed_command(&redis::cmd("FLUSHDB"))
            .await
            .map(|_| ())
            .map_err(command_error)
    }

    async fn ping(&self) -> Result<(), RemoteCacheError> {
        let mut conn = self.connection().await?;
        conn.req_packed_command(&redis::cmd("PING"))
            .await
            .map(|_| ())
            .map_err(command_error)
    }
}

/// Build the content cache from configuration.
///
/// Without a URL, or when the pool cannot be created or reached, the store is
/// local-only. Startup never fails because of the remote cache.
pub async fn create_cache_store(config: &CacheConfig) -> CacheStore {
    let Some(url) = config.redis_url.as_deref() else {
        info!(
            target = "quire::cache",
            "Remote cache not configured, using local cache"
        );
        return CacheStore::local();
    };

    let mut redis_config = deadpool_redis::Config::from_url(url);
    let mut pool_config = PoolConfig::new(config.pool_size.max(1));
    let mut timeouts = Timeouts::default();
    timeouts.wait = Some(config.timeout());
    timeouts.create = Some(config.timeout());
    timeouts.recycle = Some(config.timeout());
    pool_config.timeouts = timeouts;
    redis_config.pool = Some(pool_config);

    let pool = match redis_config.create_pool(Some(Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(err) => {
            warn!(
                target = "quire::cache",
                error = %err,
                "Failed to create remote cache pool, falling back to local cache"
            );
            return CacheStore::local();
        }
    };

    let remote = RedisCache::new(pool);
    match remote.ping().await {
        Ok(()) => {
            info!(target = "quire::cache", "Connected to remote cache");
            CacheStore::with_remote(Arc::new(remote))
        }
        Err(err) => {
            warn!(
                target = "quire::cache",
                error = %err,
                "Remote cache unreachable, falling back to local cache"
            );
            CacheStore::local()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheBackendKind;

    #[tokio::test]
    async fn missing_url_builds_local_store() {
        let store = create_cache_store(&CacheConfig::default()).await;
        assert!(!store.has_remote());
        assert_eq!(store.stats().await.backend, CacheBackendKind::LocalFallback);
    }

    #[tokio::test]
    async fn unreachable_remote_falls_back_to_local() {
        let config = CacheConfig {
            redis_url: Some("redis://127.0.0.1:1".to_string()),
            timeout_ms: 200,
            ..Default::default()
        };
        let store = create_cache_store(&config).await;
        assert!(!store.has_remote());
    }
}
