//! Response cache used as the offline fallback for the fetch client
//!
//! Successful response bodies are stored as JSON text under the key
//! `cache_<url>`. Entries never expire; a later write for the same URL
//! replaces the earlier one. The fetch client only ever reads from the
//! store; callers decide which responses are worth keeping via
//! [`cache_response`].

mod file_store;
mod memory;

pub use file_store::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix applied to every request URL to form its storage key
pub const KEY_PREFIX: &str = "cache_";

/// Errors raised by a [`ResponseStore`] backend
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the backing storage failed
    #[error("Cache storage error: {0}")]
    Io(#[from] std::io::Error),

    /// The value could not be encoded as JSON
    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key/value storage holding the last good JSON body per request URL
///
/// Reads and writes are atomic per key; there are no cross-key operations.
pub trait ResponseStore: Send + Sync {
    /// Returns the stored JSON text for `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous entry
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Builds the storage key for a request URL
pub fn cache_key(url: &str) -> String {
    format!("{}{}", KEY_PREFIX, url)
}

/// Stores `data` as the fallback body for `url`
///
/// Caching is best-effort: serialization and storage failures are logged
/// and otherwise ignored so they never interrupt the caller.
pub fn cache_response<T: Serialize + ?Sized>(store: &dyn ResponseStore, url: &str, data: &T) {
    let json = match serde_json::to_string(data) {
        Ok(json) => json,
        Err(e) => {
            warn!(url, error = %e, "Failed to cache response");
            return;
        }
    };

    match store.set(&cache_key(url), &json) {
        Ok(()) => debug!(url, bytes = json.len(), "Cached response"),
        Err(e) => warn!(url, error = %e, "Failed to cache response"),
    }
}
