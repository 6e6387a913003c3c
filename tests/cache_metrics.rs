use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use quire::application::retry::{RetryPolicy, retry};
use quire::cache::{CacheBackendKind, CacheStore, RemoteCache, RemoteCacheError};

/// Remote that refuses every command.
struct DownRemote;

fn refused() -> RemoteCacheError {
    RemoteCacheError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl RemoteCache for DownRemote {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, RemoteCacheError> {
        Err(refused())
    }

    async fn set_ex(
        &self,
        _key: &str,
        _value: &str,
        _ttl_secs: u64,
    ) -> Result<(), RemoteCacheError> {
        Err(refused())
    }

    async fn del(&self, _key: &str) -> Result<(), RemoteCacheError> {
        Err(refused())
    }

    async fn flush(&self) -> Result<(), RemoteCacheError> {
        Err(refused())
    }

    async fn ping(&self) -> Result<(), RemoteCacheError> {
        Err(refused())
    }
}

#[tokio::test(start_paused = true)]
async fn cache_and_retry_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // Remote down: every operation lands on the local map.
    let store = CacheStore::with_remote(Arc::new(DownRemote));
    assert!(store.get("getBooks:en").await.is_none());
    store
        .set("getBooks:en", "[]".to_string(), Duration::from_secs(60))
        .await;
    assert_eq!(store.get("getBooks:en").await.as_deref(), Some("[]"));
    assert_eq!(store.backend(), CacheBackendKind::LocalFallback);

    let stats = store.stats().await;
    assert!(!stats.connected);
    assert_eq!(stats.entry_count, 1);

    // Retry: every attempt fails.
    let policy = RetryPolicy::new(3, Duration::from_millis(5));
    let result: Result<(), &str> = retry(&policy, "getBooks", || async { Err("timeout") }).await;
    assert_eq!(result, Err("timeout"));

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "quire_cache_hit_total",
        "quire_cache_miss_total",
        "quire_cache_remote_fallback_total",
        "quire_retry_failure_total",
        "quire_retry_exhausted_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
