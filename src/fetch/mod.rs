//! Resilient fetch layer
//!
//! Wraps a single logical HTTP call with bounded retries, a linear backoff
//! between attempts and, when every attempt fails at the transport level, a
//! fallback to the last cached body for the same URL.

mod abort;
mod client;
mod http;

pub use abort::{AbortController, AbortSignal};
pub use client::ResilientClient;
pub use http::HttpTransport;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default delay unit for the backoff schedule
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Failures raised while performing one HTTP exchange
///
/// Every variant is treated as retryable by [`ResilientClient`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Could not reach the server
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The attempt exceeded its timeout
    #[error("Request timed out")]
    Timeout,

    /// The caller aborted the attempt
    #[error("Request aborted")]
    Aborted,
}

/// Errors returned to callers of the fetch layer
#[derive(Debug, Error)]
pub enum FetchError {
    /// All attempts failed and no cached body exists for the URL
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body is not the expected JSON
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP verbs used by the RentSure API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Per-request settings forwarded unchanged to the transport
///
/// The fetch layer never adds headers or bodies of its own; the builder
/// helpers here run on the caller's side.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Upper bound for a single attempt
    pub timeout: Option<Duration>,
    /// Lets the caller cancel in-flight attempts
    pub abort: Option<AbortSignal>,
}

impl RequestOptions {
    /// Options for a request with the given method and no body
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Options for a JSON body sent with `method`
    pub fn json<T: Serialize + ?Sized>(method: Method, body: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            method,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(serde_json::to_string(body)?),
            ..Default::default()
        })
    }

    /// Options for a JSON POST
    pub fn post_json<T: Serialize + ?Sized>(body: &T) -> Result<Self, serde_json::Error> {
        Self::json(Method::Post, body)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds an `Authorization: Bearer` header
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn abort_signal(mut self, signal: AbortSignal) -> Self {
        self.abort = Some(signal);
        self
    }
}

/// A buffered response, either live from the network or synthesized from cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    status: u16,
    body: String,
    from_cache: bool,
}

impl FetchResponse {
    /// A response received from the network
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            from_cache: false,
        }
    }

    /// A successful response built from a cached body
    pub fn cached(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            from_cache: true,
        }
    }

    /// Whether the request succeeded (2xx, or served from cache)
    pub fn ok(&self) -> bool {
        self.from_cache || (200..300).contains(&self.status)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// True when the body came from the response cache rather than the network
    pub fn is_from_cache(&self) -> bool {
        self.from_cache
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parses the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Performs one HTTP exchange per call
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<FetchResponse, TransportError>;
}

/// Retry limits and backoff for [`ResilientClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts is `max_retries + 1`
    pub max_retries: u32,
    /// Delay unit of the backoff schedule
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` and the default delay
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Wait before retry `attempt` (0-indexed): `base_delay * (attempt + 1)`
    ///
    /// The growth is linear (1s, 2s, 3s, ... with the default delay).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.saturating_add(1))
    }
}
