// Storage backend abstraction.
// Defines the backend trait and the capability probe that picks one at construction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::disk::DiskBackend;
use super::entry::{CacheEntry, CacheStats};
use super::memory::MemoryBackend;

/// Which backend implementation a cache instance ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Structured store: one JSON file per entry under the namespace directory.
    Disk,
    /// Flat in-process string store, used when no cache directory is available.
    Memory,
}

/// Storage operations every backend must provide.
///
/// Methods are infallible at this surface: backend I/O errors are logged and
/// degrade to `None`, `false`, or a no-op, so the cache can never be a source
/// of caller-visible failure.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read the entry stored under `key`, if any.
    async fn read(&self, key: &str) -> Option<CacheEntry>;

    /// Store an entry, replacing any prior entry under the same key.
    /// Returns false if the write failed.
    async fn write(&self, entry: CacheEntry) -> bool;

    /// Delete the entry under `key`. Returns true if an entry was removed.
    async fn delete(&self, key: &str) -> bool;

    /// Delete every entry in this backend.
    async fn clear(&self);

    /// Delete every entry older than `max_age`, along with any entry that
    /// can no longer be read. Returns the number of entries removed.
    async fn cleanup(&self, max_age: Duration) -> usize;

    /// All keys currently stored.
    async fn keys(&self) -> Vec<String>;

    /// Aggregate size and entry count; best-effort, skips unreadable entries.
    async fn stats(&self) -> CacheStats;
}

/// Probe storage capability once and pick a backend for the lifetime of the
/// cache instance: the disk store when a namespace directory can be created,
/// the in-memory fallback otherwise.
pub fn detect_backend(namespace: &str) -> (Arc<dyn CacheBackend>, BackendKind) {
    match DiskBackend::open(namespace) {
        Some(disk) => (Arc::new(disk), BackendKind::Disk),
        None => {
            info!(namespace, "cache directory unavailable, using in-memory fallback");
            (Arc::new(MemoryBackend::new()), BackendKind::Memory)
        }
    }
}
