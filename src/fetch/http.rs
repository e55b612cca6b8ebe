//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::Client;

use super::{FetchResponse, RequestOptions, Transport, TransportError};

/// Sends requests with a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connection(e.to_string())
    } else {
        TransportError::Request(e)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<FetchResponse, TransportError> {
        let mut request = self.client.request(options.method.into(), url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let exchange = async {
            let response = request.send().await.map_err(map_reqwest_error)?;
            let status = response.status().as_u16();
            let text = response.text().await.map_err(map_reqwest_error)?;
            Ok::<_, TransportError>(FetchResponse::new(status, text))
        };

        match &options.abort {
            Some(signal) => tokio::select! {
                result = exchange => result,
                _ = signal.aborted() => Err(TransportError::Aborted),
            },
            None => exchange.await,
        }
    }
}
