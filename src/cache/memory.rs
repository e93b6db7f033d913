// In-memory storage backend.
// Flat string store used when no cache directory is available.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::backend::CacheBackend;
use super::entry::{CacheEntry, CacheStats};

/// Fallback backend mapping raw cache keys to serialized entry JSON strings,
/// mirroring the disk backend's observable semantics without persistence.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse(key: &str, json: &str) -> Option<CacheEntry> {
        match serde_json::from_str(json) {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(key, %error, "failed to parse in-memory cache entry");
                None
            }
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.read().ok()?;
        let json = entries.get(key)?;
        Self::parse(key, json)
    }

    async fn write(&self, entry: CacheEntry) -> bool {
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(error) => {
                warn!(key = %entry.key, %error, "failed to serialize cache entry");
                return false;
            }
        };

        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(entry.key, json);
                true
            }
            Err(_) => false,
        }
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries
            .write()
            .map(|mut entries| entries.remove(key).is_some())
            .unwrap_or(false)
    }

    async fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    async fn cleanup(&self, max_age: Duration) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };

        let before = entries.len();
        entries.retain(|key, json| match Self::parse(key, json) {
            Some(entry) => entry.is_valid(max_age),
            // Unparseable entries are dropped.
            None => false,
        });

        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "cleaned up expired in-memory cache entries");
        }
        removed
    }

    async fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    async fn stats(&self) -> CacheStats {
        self.entries
            .read()
            .map(|entries| CacheStats {
                size: entries.values().map(|json| json.len() as u64).sum(),
                entries: entries.len(),
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_read_delete() {
        let backend = MemoryBackend::new();
        backend.write(CacheEntry::new("k", json!({"a": 1}))).await;

        let read = backend.read("k").await.unwrap();
        assert_eq!(read.payload, json!({"a": 1}));

        assert!(backend.delete("k").await);
        assert!(backend.read("k").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_resets_stats() {
        let backend = MemoryBackend::new();
        backend.write(CacheEntry::new("a", json!(1))).await;
        backend.write(CacheEntry::new("b", json!(2))).await;
        assert_eq!(backend.stats().await.entries, 2);

        backend.clear().await;
        assert_eq!(backend.stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_cleanup_retains_fresh_entries() {
        let backend = MemoryBackend::new();
        let mut old = CacheEntry::new("old", json!(1));
        old.stored_at = chrono::Utc::now() - chrono::Duration::hours(2);
        backend.write(old).await;
        backend.write(CacheEntry::new("fresh", json!(2))).await;

        let removed = backend.cleanup(Duration::from_secs(3600)).await;

        assert_eq!(removed, 1);
        assert!(backend.read("old").await.is_none());
        assert!(backend.read("fresh").await.is_some());
    }
}
