//! Base Transport
//!
//! The raw HTTP call underneath the gateway. [`HttpTransport`] keeps a
//! cookie store so the HTTP-only session cookie is forwarded on every call,
//! the way a browser does with `credentials: "include"`.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

use super::error::{GatewayError, GatewayResult};
use super::request::{RawResponse, RequestDescriptor};

/// A single HTTP round trip. Implementations never interpret status codes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> GatewayResult<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: &RequestDescriptor) -> GatewayResult<RawResponse> {
        (**self).send(request).await
    }
}

/// reqwest-backed transport with a per-process cookie jar
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url`.
    ///
    /// No timeout is applied unless one is given; the reqwest defaults
    /// apply otherwise.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> GatewayResult<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> GatewayResult<RawResponse> {
        let url = self.url_for(&request.endpoint);
        let mut builder = self.client.request(request.method.into(), &url);

        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Transport(format!("Request timeout: {}", url))
            } else if e.is_connect() {
                GatewayError::Transport(format!("Backend unavailable: {}", url))
            } else {
                GatewayError::from(e)
            }
        })?;

        let status = response.status().as_u16();
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            content_length,
            body,
        })
    }
}

/// Ensure the base URL ends with exactly one `/` so endpoint paths append
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}
