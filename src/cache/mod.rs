//! Content cache.
//!
//! A key/value store with per-entry TTL used by the content service for its
//! cache-aside read path:
//!
//! - **Remote**: a shared Redis-protocol backend, used when configured and reachable
//! - **Local**: an in-process map that takes over for any operation the remote fails
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! redis_url = "redis://127.0.0.1:6379"
//! timeout_ms = 2000
//! content_ttl_seconds = 300
//! ```

mod config;
mod keys;
mod lock;
mod remote;
mod store;

pub use config::CacheConfig;
pub use keys::{CacheKey, ContentMethod, UnknownMethod};
pub use remote::{RemoteCache, RemoteCacheError};
pub use store::{CacheBackendKind, CacheStats, CacheStore};
