//! Runtime configuration assembled from command-line flags and environment

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{FileStore, MemoryStore, ResponseStore};
use crate::cli::{Cli, CliError};
use crate::data::RentSureClient;
use crate::fetch::{HttpTransport, ResilientClient, RetryPolicy};

/// Where cached responses are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    /// The per-user cache directory
    Default,
    /// An explicit directory
    Dir(PathBuf),
    /// In memory for this run only
    Memory,
}

/// Settings needed to talk to the API
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub retry: RetryPolicy,
    pub cache: CacheLocation,
    pub json: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let cache = if cli.no_cache {
            CacheLocation::Memory
        } else if let Some(dir) = &cli.cache_dir {
            CacheLocation::Dir(dir.clone())
        } else {
            CacheLocation::Default
        };

        Self {
            api_url: cli.api_url.clone(),
            token: cli.token.clone().filter(|t| !t.is_empty()),
            retry: RetryPolicy::with_retries(cli.retries),
            cache,
            json: cli.json,
        }
    }

    /// Token for owner commands
    pub fn require_token(&self) -> Result<&str, CliError> {
        self.token.as_deref().ok_or(CliError::MissingToken)
    }

    /// Opens the response store
    ///
    /// Falls back to an in-memory store when no home directory is available.
    pub fn store(&self) -> Arc<dyn ResponseStore> {
        match &self.cache {
            CacheLocation::Memory => Arc::new(MemoryStore::new()),
            CacheLocation::Dir(dir) => Arc::new(FileStore::with_dir(dir.clone())),
            CacheLocation::Default => match FileStore::new() {
                Some(store) => {
                    debug!(dir = %store.dir().display(), "Using disk cache");
                    Arc::new(store)
                }
                None => {
                    warn!("No cache directory available, caching in memory");
                    Arc::new(MemoryStore::new())
                }
            },
        }
    }

    /// Builds the API client over HTTP
    pub fn client(&self) -> RentSureClient {
        let http = ResilientClient::new(Arc::new(HttpTransport::new()), self.store())
            .with_policy(self.retry.clone());
        RentSureClient::new(self.api_url.clone(), http)
    }
}
