//! Cache configuration.
//!
//! Controls the optional remote backend and the content TTL via `quire.toml`.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TIMEOUT_MS: u64 = 2000;
const DEFAULT_POOL_SIZE: usize = 8;
const DEFAULT_CONTENT_TTL_SECS: u64 = 300;

/// Cache configuration from `quire.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Connection string of the remote cache. `None` keeps everything in-process.
    pub redis_url: Option<String>,
    /// Connect/wait timeout for the remote cache (ms).
    pub timeout_ms: u64,
    /// Maximum pooled remote connections.
    pub pool_size: usize,
    /// TTL applied to every content entry (seconds).
    pub content_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            pool_size: DEFAULT_POOL_SIZE,
            content_ttl_secs: DEFAULT_CONTENT_TTL_SECS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            redis_url: settings.redis_url.clone(),
            timeout_ms: settings.timeout.as_millis() as u64,
            pool_size: settings.pool_size.get() as usize,
            content_ttl_secs: settings.content_ttl.as_secs(),
        }
    }
}

impl CacheConfig {
    /// Returns true when a remote backend should be attempted.
    pub fn has_remote(&self) -> bool {
        self.redis_url.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Content TTL, clamped to at least one second.
    pub fn content_ttl(&self) -> Duration {
        Duration::from_secs(self.content_ttl_secs.max(1))
    }
}
