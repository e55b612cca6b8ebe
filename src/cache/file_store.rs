//! Disk-backed response store
//!
//! Each key is persisted as its own JSON file so that concurrent writers for
//! different URLs never touch the same file.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{CacheError, ResponseStore};

/// Record written to disk for one cache key
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry<'a> {
    /// The full storage key (`cache_<url>`)
    key: String,
    /// The cached JSON body, kept verbatim
    #[serde(borrow)]
    data: &'a RawValue,
    /// When the body was cached
    cached_at: DateTime<Utc>,
}

/// Persists response bodies to JSON files in a cache directory
///
/// Uses `~/.cache/rentsure/` on Linux (or the platform equivalent). File
/// names are the SHA-256 digest of the key, since URLs may contain
/// characters that are not valid in paths.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileStore {
    /// Creates a FileStore in the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "rentsure")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a FileStore rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path of the file holding `key`
    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.cache_dir.join(format!("{:x}.json", digest))
    }

    /// Returns when `key` was last written, if present
    pub fn cached_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let content = fs::read_to_string(self.entry_path(key)).ok()?;
        let entry: StoredEntry = serde_json::from_str(&content).ok()?;
        (entry.key == key).then_some(entry.cached_at)
    }
}

impl ResponseStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let content = fs::read_to_string(self.entry_path(key)).ok()?;
        let entry: StoredEntry = serde_json::from_str(&content).ok()?;

        // Guard against digest collisions
        if entry.key != key {
            debug!(key, stored = %entry.key, "Cache file key mismatch");
            return None;
        }

        Some(entry.data.get().to_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir)?;

        let data: &RawValue = serde_json::from_str(value)?;
        let entry = StoredEntry {
            key: key.to_string(),
            data,
            cached_at: Utc::now(),
        };
        let json = serde_json::to_string(&entry)?;

        // Write-then-rename so readers never observe a partial file; each
        // writer gets its own temp file
        let mut tmp = NamedTempFile::new_in(&self.cache_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(self.entry_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.get("cache_http://localhost:8000/cities").is_none());
    }

    #[test]
    fn test_set_then_get_returns_same_json() {
        let (store, _temp_dir) = create_test_store();
        let body = json!({"cities": [{"id": "nagpur", "name": "Nagpur"}]}).to_string();

        store.set("cache_http://localhost:8000/cities", &body).expect("Write should succeed");

        let raw = store.get("cache_http://localhost:8000/cities").expect("Should read entry");
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, json!({"cities": [{"id": "nagpur", "name": "Nagpur"}]}));
    }

    #[test]
    fn test_url_with_query_string_is_a_valid_key() {
        let (store, temp_dir) = create_test_store();
        let key = "cache_http://localhost:8000/search?city=pune&query=near%20COEP&rank_by=match&top_n=10";

        store.set(key, "[1,2,3]").expect("Write should succeed");

        assert_eq!(store.get(key).as_deref(), Some("[1,2,3]"));
        let files: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1, "One file per key, no temp files left behind");
    }

    #[test]
    fn test_overwrite_existing_entry() {
        let (store, _temp_dir) = create_test_store();

        store.set("cache_/rental/P1", "{\"rent\":1}").unwrap();
        store.set("cache_/rental/P1", "{\"rent\":2}").unwrap();

        let raw = store.get("cache_/rental/P1").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, json!({"rent": 2}));
    }

    #[test]
    fn test_set_rejects_invalid_json() {
        let (store, _temp_dir) = create_test_store();
        let result = store.set("cache_/bad", "not json");
        assert!(matches!(result, Err(CacheError::Serialize(_))));
        assert!(store.get("cache_/bad").is_none());
    }

    #[test]
    fn test_set_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache");
        let store = FileStore::with_dir(nested_path.clone());

        store.set("cache_/cities", "{}").expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
    }

    #[test]
    fn test_set_fails_when_directory_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = FileStore::with_dir(blocker);

        assert!(matches!(store.set("cache_/cities", "{}"), Err(CacheError::Io(_))));
    }

    #[test]
    fn test_concurrent_writes_to_same_key_all_succeed() {
        let (store, _temp_dir) = create_test_store();
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|j| store.set("cache_/cities", &format!("[{}, {}]", i, j)))
                        .filter(|r| r.is_err())
                        .count()
                })
            })
            .collect();

        let failures: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(failures, 0);

        let cached: serde_json::Value =
            serde_json::from_str(&store.get("cache_/cities").expect("entry readable")).unwrap();
        assert_eq!(cached.as_array().map(Vec::len), Some(2));

        let leftovers = fs::read_dir(store.dir()).unwrap().count();
        assert_eq!(leftovers, 1, "only the entry file should remain");
    }

    #[test]
    fn test_cached_at_timestamp_is_recorded() {
        let (store, _temp_dir) = create_test_store();

        let before = Utc::now();
        store.set("cache_/trust-metrics", "{}").unwrap();
        let after = Utc::now();

        let cached_at = store.cached_at("cache_/trust-metrics").expect("Should have timestamp");
        assert!(cached_at >= before);
        assert!(cached_at <= after);
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(store) = FileStore::new() {
            let path_str = store.dir().to_string_lossy();
            assert!(path_str.contains("rentsure"), "Cache path should contain project name");
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
