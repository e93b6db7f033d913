// Cache store facade.
// TTL-checked reads, overwrite-on-set, pattern invalidation, and the periodic sweep.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use regex::Regex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use super::backend::{BackendKind, CacheBackend, detect_backend};
use super::entry::{CacheEntry, CacheStats};
use super::key;

/// Default TTL for cached responses: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default maximum entry age enforced by the periodic sweep: 1 hour.
pub const DEFAULT_SWEEP_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Default interval between sweep runs: 10 minutes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Configuration for an [`ApiCache`] instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Logical container name scoping all keys of this instance.
    pub namespace: String,
    /// How often the background sweep runs once started.
    pub sweep_interval: Duration,
    /// Maximum entry age enforced by the sweep, independent of per-read TTLs.
    pub sweep_max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: "cachegate".to_string(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            sweep_max_age: DEFAULT_SWEEP_MAX_AGE,
        }
    }
}

/// Pattern selecting cache keys for bulk invalidation.
#[derive(Debug, Clone)]
pub enum InvalidatePattern {
    /// Matches keys containing the given substring.
    Substring(String),
    /// Matches keys the regex tests positive against.
    Regex(Regex),
}

impl InvalidatePattern {
    pub fn matches(&self, cache_key: &str) -> bool {
        match self {
            InvalidatePattern::Substring(fragment) => cache_key.contains(fragment),
            InvalidatePattern::Regex(regex) => regex.is_match(cache_key),
        }
    }
}

impl From<&str> for InvalidatePattern {
    fn from(fragment: &str) -> Self {
        InvalidatePattern::Substring(fragment.to_string())
    }
}

impl From<Regex> for InvalidatePattern {
    fn from(regex: Regex) -> Self {
        InvalidatePattern::Regex(regex)
    }
}

/// Best-effort store for API response payloads, keyed by request shape.
///
/// The backend is picked once at construction (disk when a namespace cache
/// directory is available, in-memory otherwise) and never changes for the
/// lifetime of the instance. One instance per namespace is expected, created
/// at application start and shared behind an `Arc`.
///
/// No operation here returns an error: storage failures degrade to cache
/// misses or no-ops and are only logged, so the cache stays a pure
/// performance optimization.
pub struct ApiCache {
    config: CacheConfig,
    backend: Arc<dyn CacheBackend>,
    kind: BackendKind,
    sweep: Mutex<Option<JoinHandle<()>>>,
}

impl ApiCache {
    /// Create a cache with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a cache with the given configuration, probing backend
    /// capability once.
    pub fn with_config(config: CacheConfig) -> Self {
        let (backend, kind) = detect_backend(&config.namespace);
        Self::with_backend(backend, kind, config)
    }

    /// Create a cache over an explicit backend, bypassing capability
    /// detection. Used for dependency injection and tests.
    pub fn with_backend(
        backend: Arc<dyn CacheBackend>,
        kind: BackendKind,
        config: CacheConfig,
    ) -> Self {
        Self {
            config,
            backend,
            kind,
            sweep: Mutex::new(None),
        }
    }

    /// Which backend the capability probe selected.
    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    /// The namespace this instance scopes its keys under.
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Generate a deterministic cache key for a request shape.
    pub fn generate_key(
        url: &str,
        method: &str,
        params: Option<&Value>,
        body: Option<&Value>,
    ) -> String {
        key::generate_key(url, method, params, body)
    }

    /// Read the payload under `key` if it is younger than `ttl`.
    ///
    /// The TTL is supplied at read time, not fixed at write time; an expired
    /// entry is deleted as a side effect of the read.
    pub async fn get(&self, key: &str, ttl: Duration) -> Option<Value> {
        let entry = self.backend.read(key).await?;

        if entry.is_expired(ttl) {
            debug!(key, "cache entry expired, evicting");
            self.backend.delete(key).await;
            return None;
        }

        Some(entry.payload)
    }

    /// Store a payload under `key`, replacing any prior entry and stamping
    /// the current time.
    pub async fn set(&self, key: &str, payload: Value) {
        self.backend.write(CacheEntry::new(key, payload)).await;
    }

    /// Delete one entry; no-op if absent.
    pub async fn remove(&self, key: &str) {
        self.backend.delete(key).await;
    }

    /// Delete all entries in this namespace.
    pub async fn clear(&self) {
        self.backend.clear().await;
        debug!(namespace = %self.config.namespace, "cache cleared");
    }

    /// Delete all entries older than `max_age`, returning how many were
    /// removed. This is the clock the sweep runs on, independent of any
    /// per-read TTL.
    pub async fn cleanup(&self, max_age: Duration) -> usize {
        self.backend.cleanup(max_age).await
    }

    /// Aggregate entry count and serialized size.
    pub async fn stats(&self) -> CacheStats {
        self.backend.stats().await
    }

    /// Delete every entry whose key matches the pattern, returning how many
    /// were removed.
    pub async fn invalidate(&self, pattern: &InvalidatePattern) -> usize {
        let mut removed = 0;
        for cache_key in self.backend.keys().await {
            if pattern.matches(&cache_key) && self.backend.delete(&cache_key).await {
                debug!(key = %cache_key, "invalidated cache entry");
                removed += 1;
            }
        }
        removed
    }

    /// Start the periodic background sweep. Idempotent; must be called from
    /// within a tokio runtime.
    pub fn start_sweep(&self) {
        let mut sweep = match self.sweep.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if sweep.is_some() {
            return;
        }

        let backend = Arc::clone(&self.backend);
        let interval = self.config.sweep_interval;
        let max_age = self.config.sweep_max_age;

        *sweep = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so a freshly started
            // sweep does not race entries written moments before.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = backend.cleanup(max_age).await;
                debug!(removed, "cache sweep completed");
            }
        }));
    }

    /// Stop the background sweep if it is running.
    pub fn stop_sweep(&self) {
        if let Ok(mut sweep) = self.sweep.lock()
            && let Some(handle) = sweep.take()
        {
            handle.abort();
        }
    }
}

impl Default for ApiCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ApiCache {
    fn drop(&mut self) {
        self.stop_sweep();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryBackend;
    use serde_json::json;

    fn memory_cache() -> (Arc<MemoryBackend>, ApiCache) {
        let backend = Arc::new(MemoryBackend::new());
        let cache = ApiCache::with_backend(
            Arc::clone(&backend) as Arc<dyn CacheBackend>,
            BackendKind::Memory,
            CacheConfig::default(),
        );
        (backend, cache)
    }

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let (_backend, cache) = memory_cache();
        let payload = json!({"data": [{"id": 1}, {"id": 2}], "total": 2});

        cache.set("GET|/users", payload.clone()).await;

        let hit = cache.get("GET|/users", Duration::from_secs(300)).await;
        assert_eq!(hit, Some(payload));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (_backend, cache) = memory_cache();
        assert!(cache.get("GET|/absent", Duration::from_secs(300)).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted_on_read() {
        let (backend, cache) = memory_cache();

        let mut entry = CacheEntry::new("GET|/users", json!({"data": []}));
        entry.stored_at = chrono::Utc::now() - chrono::Duration::milliseconds(300_001);
        backend.write(entry).await;

        let miss = cache.get("GET|/users", Duration::from_millis(300_000)).await;
        assert!(miss.is_none());

        // Lazy eviction: the expired entry is gone entirely.
        assert!(backend.read("GET|/users").await.is_none());
    }

    #[tokio::test]
    async fn test_ttl_evaluated_per_read() {
        let (backend, cache) = memory_cache();

        let mut entry = CacheEntry::new("k", json!(1));
        entry.stored_at = chrono::Utc::now() - chrono::Duration::seconds(30);
        backend.write(entry).await;

        // The same entry hits with a generous TTL and misses with a tight one.
        assert!(cache.get("k", Duration::from_secs(60)).await.is_some());
        assert!(cache.get("k", Duration::from_secs(10)).await.is_none());
    }

    #[tokio::test]
    async fn test_set_replaces_prior_entry() {
        let (_backend, cache) = memory_cache();
        cache.set("k", json!({"v": 1})).await;
        cache.set("k", json!({"v": 2})).await;

        let hit = cache.get("k", Duration::from_secs(300)).await;
        assert_eq!(hit, Some(json!({"v": 2})));
        assert_eq!(cache.stats().await.entries, 1);
    }

    #[tokio::test]
    async fn test_remove_then_get() {
        let (_backend, cache) = memory_cache();
        cache.set("k", json!(1)).await;
        cache.remove("k").await;

        assert!(cache.get("k", Duration::from_secs(300)).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_then_stats() {
        let (_backend, cache) = memory_cache();
        cache.set("a", json!(1)).await;
        cache.set("b", json!(2)).await;

        cache.clear().await;

        assert_eq!(cache.stats().await.entries, 0);
        assert_eq!(cache.stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_invalidate_substring() {
        let (_backend, cache) = memory_cache();
        cache.set("GET|/users|{\"page\":1}", json!(1)).await;
        cache.set("GET|/posts|{\"page\":1}", json!(2)).await;
        cache.set("GET|/users/1", json!(3)).await;

        let removed = cache.invalidate(&InvalidatePattern::from("/users")).await;

        assert_eq!(removed, 2);
        assert!(cache.get("GET|/users|{\"page\":1}", DEFAULT_TTL).await.is_none());
        assert!(cache.get("GET|/users/1", DEFAULT_TTL).await.is_none());
        assert!(cache.get("GET|/posts|{\"page\":1}", DEFAULT_TTL).await.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_regex() {
        let (_backend, cache) = memory_cache();
        cache.set("GET|/users/1", json!(1)).await;
        cache.set("GET|/users/20", json!(2)).await;
        cache.set("GET|/users", json!(3)).await;

        let pattern = InvalidatePattern::from(Regex::new(r"/users/\d+$").unwrap());
        let removed = cache.invalidate(&pattern).await;

        assert_eq!(removed, 2);
        assert!(cache.get("GET|/users", DEFAULT_TTL).await.is_some());
    }

    #[tokio::test]
    async fn test_cleanup_uses_its_own_clock() {
        let (backend, cache) = memory_cache();

        let mut old = CacheEntry::new("old", json!(1));
        old.stored_at = chrono::Utc::now() - chrono::Duration::minutes(30);
        backend.write(old).await;
        cache.set("fresh", json!(2)).await;

        // A 30-minute-old entry survives the 1-hour sweep clock even though
        // a 5-minute read TTL would reject it.
        assert_eq!(cache.cleanup(DEFAULT_SWEEP_MAX_AGE).await, 0);
        assert!(cache.get("old", DEFAULT_TTL).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_lifecycle_is_idempotent() {
        let (_backend, cache) = memory_cache();
        cache.start_sweep();
        cache.start_sweep();
        cache.stop_sweep();
        cache.stop_sweep();
    }
}
