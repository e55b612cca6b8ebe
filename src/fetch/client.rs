//! Retry loop with cache fallback

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{FetchError, FetchResponse, RequestOptions, RetryPolicy, Transport};
use crate::cache::{cache_key, ResponseStore};

/// HTTP client that retries failed attempts and falls back to cached bodies
///
/// The client keeps no state between calls. It reads from the response
/// store only after the final attempt has failed at the transport level, and
/// never writes to it; storing successful bodies is up to the caller (see
/// [`crate::cache::cache_response`]).
#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn ResponseStore>,
    policy: RetryPolicy,
}

impl ResilientClient {
    /// Creates a client with the default retry policy
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn ResponseStore>) -> Self {
        Self {
            transport,
            store,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The store consulted on terminal transport failures
    pub fn store(&self) -> &dyn ResponseStore {
        self.store.as_ref()
    }

    /// GET `url` with the default retry limit
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.fetch_with_retry(url, &RequestOptions::default(), None).await
    }

    /// Performs the request with up to `max_retries + 1` attempts
    ///
    /// * A successful response is returned immediately.
    /// * A failing status is retried; on the last attempt it is returned
    ///   as-is, even if a cached body exists.
    /// * A transport error is retried; on the last attempt the cached body
    ///   for `url` is returned as a cache-served response, or the error is
    ///   propagated if nothing is cached.
    ///
    /// Retry `i` (0-indexed) waits `base_delay * (i + 1)` first. `None` uses
    /// the policy's `max_retries`.
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        options: &RequestOptions,
        max_retries: Option<u32>,
    ) -> Result<FetchResponse, FetchError> {
        let max_retries = max_retries.unwrap_or(self.policy.max_retries);
        let mut attempt: u32 = 0;

        loop {
            debug!(
                url,
                attempt = attempt.saturating_add(1),
                max_attempts = max_retries.saturating_add(1),
                "Sending request"
            );

            match self.transport.send(url, options).await {
                Ok(response) => {
                    if response.ok() || attempt >= max_retries {
                        return Ok(response);
                    }

                    let backoff = self.policy.backoff(attempt);
                    warn!(
                        url,
                        status = response.status(),
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        "Request returned failing status, retrying"
                    );
                    sleep(backoff).await;
                }
                Err(e) => {
                    if attempt >= max_retries {
                        if let Some(cached) = self.store.get(&cache_key(url)) {
                            info!(url, error = %e, "Using cached data");
                            return Ok(FetchResponse::cached(cached));
                        }
                        warn!(url, attempts = attempt.saturating_add(1), error = %e, "Request failed with no cached data");
                        return Err(e.into());
                    }

                    let backoff = self.policy.backoff(attempt);
                    warn!(
                        url,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    sleep(backoff).await;
                }
            }

            attempt += 1;
        }
    }
}
