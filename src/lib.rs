// cachegate: cached HTTP request gateway.
// A consult-before-fetch response cache with TTL expiry, periodic sweep
// cleanup, and pluggable storage backends behind a reqwest-based client.

pub mod cache;
pub mod error;
pub mod gateway;

pub use cache::{
    ApiCache, BackendKind, CacheBackend, CacheConfig, CacheEntry, CacheStats, DiskBackend,
    InvalidatePattern, MemoryBackend,
};
pub use error::{CachegateError, Result};
pub use gateway::{ApiClient, CacheOptions, ErrorOptions, LogNotifier, Notifier, RequestOptions};
