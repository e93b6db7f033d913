// Cache module.
// Key generation, TTL-stamped entries, storage backends, and the store facade.

pub mod backend;
pub mod disk;
pub mod entry;
pub mod key;
pub mod memory;
pub mod store;

pub use backend::{BackendKind, CacheBackend, detect_backend};
pub use disk::DiskBackend;
pub use entry::{CacheEntry, CacheStats};
pub use key::generate_key;
pub use memory::MemoryBackend;
pub use store::{
    ApiCache, CacheConfig, DEFAULT_SWEEP_INTERVAL, DEFAULT_SWEEP_MAX_AGE, DEFAULT_TTL,
    InvalidatePattern,
};
