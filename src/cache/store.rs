//! Cache storage.
//!
//! Remote first, local on failure. The two stores are not reconciled: a write
//! made while the remote is down lives only in the local map and disappears
//! with the process.

use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::lock::{rw_read, rw_write};
use super::remote::{RemoteCache, RemoteCacheError};

const SOURCE: &str = "cache::store";

const METRIC_CACHE_HIT_TOTAL: &str = "quire_cache_hit_total";
const METRIC_CACHE_MISS_TOTAL: &str = "quire_cache_miss_total";
const METRIC_CACHE_FALLBACK_TOTAL: &str = "quire_cache_remote_fallback_total";

/// Which store served the most recent operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackendKind {
    Remote,
    LocalFallback,
}

/// Diagnostic snapshot of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub backend: CacheBackendKind,
    /// Whether the remote answered a ping. Always false without a remote.
    pub connected: bool,
    /// Entries held by the local map, expired ones included until swept.
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
struct LocalEntry {
    payload: String,
    inserted_at: Instant,
    ttl: Duration,
}

impl LocalEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

/// Key/value store with per-entry TTL.
///
/// Remote failures are logged and never returned; the operation is served by
/// the local map instead.
pub struct CacheStore {
    remote: Option<Arc<dyn RemoteCache>>,
    local: RwLock<HashMap<String, LocalEntry>>,
    remote_active: AtomicBool,
}

impl CacheStore {
    /// Store backed only by the in-process map.
    pub fn local() -> Self {
        Self {
            remote: None,
            local: RwLock::new(HashMap::new()),
            remote_active: AtomicBool::new(false),
        }
    }

    /// Store that prefers `remote` and falls back to the in-process map.
    pub fn with_remote(remote: Arc<dyn RemoteCache>) -> Self {
        Self {
            remote: Some(remote),
            local: RwLock::new(HashMap::new()),
            remote_active: AtomicBool::new(true),
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(remote) = &self.remote {
            match remote.get(key).await {
                Ok(value) => {
                    self.mark_remote();
                    record_lookup(value.is_some(), CacheBackendKind::Remote);
                    return value;
                }
                Err(err) => self.mark_fallback(remote.name(), "get", key, &err),
            }
        }

        let value = self.local_get(key);
        record_lookup(value.is_some(), CacheBackendKind::LocalFallback);
        value
    }

    /// Store `value` under `key` for `ttl`. A zero TTL stores nothing.
    pub async fn set(&self, key: &str, value: String, ttl: Duration) {
        if ttl.is_zero() {
            self.delete(key).await;
            return;
        }

        if let Some(remote) = &self.remote {
            let ttl_secs = ttl_seconds(ttl);
            match remote.set_ex(key, &value, ttl_secs).await {
                Ok(()) => {
                    self.mark_remote();
                    debug!(key, ttl_secs, backend = remote.name(), "cache set");
                    return;
                }
                Err(err) => self.mark_fallback(remote.name(), "set", key, &err),
            }
        }

        rw_write(&self.local, SOURCE, "set").insert(
            key.to_string(),
            LocalEntry {
                payload: value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
        debug!(key, ttl_ms = ttl.as_millis() as u64, "cache set (local)");
    }

    /// Remove `key` from both stores.
    pub async fn delete(&self, key: &str) {
        if let Some(remote) = &self.remote {
            match remote.del(key).await {
                Ok(()) => self.mark_remote(),
                Err(err) => self.mark_fallback(remote.name(), "delete", key, &err),
            }
        }

        rw_write(&self.local, SOURCE, "delete").remove(key);
    }

    /// Drop every entry from both stores.
    pub async fn clear(&self) {
        if let Some(remote) = &self.remote {
            match remote.flush().await {
                Ok(()) => self.mark_remote(),
                Err(err) => self.mark_fallback(remote.name(), "clear", "*", &err),
            }
        }

        rw_write(&self.local, SOURCE, "clear").clear();
    }

    /// Sweep expired entries out of the local map, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut guard = rw_write(&self.local, SOURCE, "cleanup_expired");
        let before = guard.len();
        guard.retain(|_, entry| !entry.is_expired(now));
        before - guard.len()
    }

    pub async fn stats(&self) -> CacheStats {
        let connected = match &self.remote {
            Some(remote) => match remote.ping().await {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        target = "quire::cache",
                        backend = remote.name(),
                        error = %err,
                        "Remote cache ping failed"
                    );
                    false
                }
            },
            None => false,
        };

        CacheStats {
            backend: self.backend(),
            connected,
            entry_count: rw_read(&self.local, SOURCE, "stats").len(),
        }
    }

    /// Path that served the most recent operation.
    pub fn backend(&self) -> CacheBackendKind {
        if self.remote.is_some() && self.remote_active.load(Ordering::Relaxed) {
            CacheBackendKind::Remote
        } else {
            CacheBackendKind::LocalFallback
        }
    }

    /// Decode a cached JSON payload. Undecodable payloads are dropped and reported as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.get(key).await?;
        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    target = "quire::cache",
                    key,
                    error = %err,
                    "Discarding undecodable cache payload"
                );
                self.delete(key).await;
                None
            }
        }
    }

    /// Encode `value` as JSON and store it. Encoding failures skip the write.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_string(value) {
            Ok(payload) => self.set(key, payload, ttl).await,
            Err(err) => warn!(
                target = "quire::cache",
                key,
                error = %err,
                "Skipping cache write for unencodable value"
            ),
        }
    }

    fn local_get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let guard = rw_read(&self.local, SOURCE, "get");
            match guard.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.payload.clone()),
                Some(_) => {}
            }
        }

        // Lazy eviction; re-check under the write lock in case a fresh value landed.
        let mut guard = rw_write(&self.local, SOURCE, "get.evict");
        if guard.get(key).is_some_and(|entry| entry.is_expired(now)) {
            guard.remove(key);
        }
        None
    }

    fn mark_remote(&self) {
        self.remote_active.store(true, Ordering::Relaxed);
    }

    fn mark_fallback(
        &self,
        backend: &'static str,
        op: &'static str,
        key: &str,
        err: &RemoteCacheError,
    ) {
        self.remote_active.store(false, Ordering::Relaxed);
        counter!(METRIC_CACHE_FALLBACK_TOTAL, "op" => op).increment(1);
        warn!(
            target = "quire::cache",
            backend,
            op,
            key,
            error = %err,
            "Remote cache failed; using local map"
        );
    }
}

fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

fn record_lookup(hit: bool, backend: CacheBackendKind) {
    let label = match backend {
        CacheBackendKind::Remote => "remote",
        CacheBackendKind::LocalFallback => "local",
    };
    if hit {
        counter!(METRIC_CACHE_HIT_TOTAL, "backend" => label).increment(1);
    } else {
        counter!(METRIC_CACHE_MISS_TOTAL, "backend" => label).increment(1);
    }
}
