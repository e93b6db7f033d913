// Disk storage backend.
// Stores one JSON file per cache entry, addressed by the encoded cache key.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use directories::ProjectDirs;
use tracing::{debug, warn};

use super::backend::CacheBackend;
use super::entry::{CacheEntry, CacheStats};

const ENTRY_EXTENSION: &str = "json";

/// Structured backend keeping each entry as a JSON file under the namespace
/// directory. Filenames are the URL-safe base64 encoding of the cache key,
/// so arbitrary key content maps to valid paths.
#[derive(Debug)]
pub struct DiskBackend {
    dir: PathBuf,
}

impl DiskBackend {
    /// Open the backend for a namespace under the platform cache directory
    /// (e.g. `~/.cache/cachegate/<namespace>` on Linux). Returns `None` when
    /// no cache directory can be resolved or created.
    pub fn open(namespace: &str) -> Option<Self> {
        let dirs = ProjectDirs::from("", "", "cachegate")?;
        let dir = dirs.cache_dir().join(namespace);
        Self::at(dir)
    }

    /// Open the backend rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Option<Self> {
        let dir = dir.into();
        match fs::create_dir_all(&dir) {
            Ok(()) => Some(Self { dir }),
            Err(error) => {
                warn!(dir = %dir.display(), %error, "failed to create cache directory");
                None
            }
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let encoded = URL_SAFE_NO_PAD.encode(key.as_bytes());
        self.dir.join(encoded).with_extension(ENTRY_EXTENSION)
    }

    /// All entry files currently present, in no particular order.
    fn entry_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(dir = %self.dir.display(), %error, "failed to list cache directory");
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION))
            .collect()
    }

    fn read_entry_file(path: &Path) -> Option<CacheEntry> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to parse cache entry");
                None
            }
        }
    }

    fn remove_entry_file(path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => false,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to delete cache entry");
                false
            }
        }
    }

    /// Write the serialized entry atomically via a temp file rename.
    fn write_entry_file(path: &Path, json: &str) -> std::io::Result<()> {
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for DiskBackend {
    async fn read(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }
        Self::read_entry_file(&path)
    }

    async fn write(&self, entry: CacheEntry) -> bool {
        let path = self.entry_path(&entry.key);
        let json = match serde_json::to_string_pretty(&entry) {
            Ok(json) => json,
            Err(error) => {
                warn!(key = %entry.key, %error, "failed to serialize cache entry");
                return false;
            }
        };

        match Self::write_entry_file(&path, &json) {
            Ok(()) => true,
            Err(error) => {
                warn!(key = %entry.key, %error, "failed to write cache entry");
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> bool {
        Self::remove_entry_file(&self.entry_path(key))
    }

    async fn clear(&self) {
        for path in self.entry_files() {
            Self::remove_entry_file(&path);
        }
    }

    async fn cleanup(&self, max_age: Duration) -> usize {
        let mut removed = 0;
        for path in self.entry_files() {
            match Self::read_entry_file(&path) {
                Some(entry) if entry.is_expired(max_age) => {
                    if Self::remove_entry_file(&path) {
                        debug!(key = %entry.key, "cleaned up expired cache entry");
                        removed += 1;
                    }
                }
                Some(_) => {}
                // Unreadable entries are dead weight, drop them too.
                None => {
                    if Self::remove_entry_file(&path) {
                        removed += 1;
                    }
                }
            }
        }
        removed
    }

    async fn keys(&self) -> Vec<String> {
        self.entry_files()
            .iter()
            .filter_map(|path| Self::read_entry_file(path))
            .map(|entry| entry.key)
            .collect()
    }

    async fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for path in self.entry_files() {
            stats.entries += 1;
            if let Ok(contents) = fs::read_to_string(&path) {
                stats.size += contents.len() as u64;
            }
        }
        stats
    }
}
