//! Remote cache seam.
//!
//! The store talks to the shared backend through this trait so the Redis
//! adapter lives in `infra` and tests can substitute an in-memory or failing
//! backend.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteCacheError {
    #[error("remote cache unavailable: {0}")]
    Unavailable(String),
    #[error("remote cache command failed: {0}")]
    Command(String),
}

#[async_trait]
pub trait RemoteCache: Send + Sync {
    /// Backend label for logs and diagnostics.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, RemoteCacheError>;

    /// Store `value` with a TTL enforced by the backend.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), RemoteCacheError>;

    async fn del(&self, key: &str) -> Result<(), RemoteCacheError>;

    /// Drop every key in the selected database.
    async fn flush(&self) -> Result<(), RemoteCacheError>;

    async fn ping(&self) -> Result<(), RemoteCacheError>;
}
