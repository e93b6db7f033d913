// Cache entry wrapper.
// Pairs a payload with its storage timestamp for TTL checking at read time.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single cached payload with metadata.
///
/// Entries are never mutated in place; a write under an existing key fully
/// replaces the prior entry with a fresh `stored_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cache key this entry was stored under.
    pub key: String,
    /// The cached payload.
    pub payload: Value,
    /// When the payload was stored.
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(key: impl Into<String>, payload: Value) -> Self {
        Self {
            key: key.into(),
            payload,
            stored_at: Utc::now(),
        }
    }

    /// Check whether this entry is older than the given TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let elapsed = Utc::now()
            .signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::MAX);

        elapsed > ttl
    }

    /// Check whether this entry is still fresh for the given TTL.
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.is_expired(ttl)
    }
}

/// Aggregate cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total byte length of serialized entries.
    pub size: u64,
    /// Number of entries.
    pub entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_entry_is_valid() {
        let entry = CacheEntry::new("GET|/users", json!({"data": []}));
        assert!(entry.is_valid(Duration::from_secs(300)));
        assert!(!entry.is_expired(Duration::from_secs(300)));
    }

    #[test]
    fn test_old_entry_expires() {
        let mut entry = CacheEntry::new("GET|/users", json!({"data": []}));
        entry.stored_at = Utc::now() - chrono::Duration::milliseconds(300_001);

        assert!(entry.is_expired(Duration::from_millis(300_000)));
        assert!(!entry.is_valid(Duration::from_millis(300_000)));
    }

    #[test]
    fn test_entry_round_trips_through_json() {
        let entry = CacheEntry::new("GET|/users", json!({"nested": {"values": [1, 2, 3]}}));
        let serialized = serde_json::to_string(&entry).unwrap();
        let restored: CacheEntry = serde_json::from_str(&serialized).unwrap();

        assert_eq!(restored.key, entry.key);
        assert_eq!(restored.payload, entry.payload);
        assert_eq!(restored.stored_at, entry.stored_at);
    }
}
