//! API Client
//!
//! The single entry point feature code uses to reach the backend. Sends
//! through a [`Transport`] (normally [`SessionRenewal`] over
//! [`HttpTransport`]) and turns the raw response into a JSON value, an
//! empty result, or a [`GatewayError`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::error::{GatewayError, GatewayResult};
use super::renewal::{RenewalPolicy, SessionRenewal};
use super::request::{Method, RawResponse, RequestDescriptor};
use super::transport::{HttpTransport, Transport};
use crate::config::{ApiConfig, AuthConfig};

/// Cheap to clone; clones share the transport and its cookie jar
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build the production stack: cookie-carrying HTTP transport wrapped
    /// in the renewal decorator.
    pub fn connect(api: &ApiConfig, auth: &AuthConfig) -> GatewayResult<Self> {
        let timeout = api.request_timeout_secs.map(Duration::from_secs);
        let http = HttpTransport::new(&api.base_url, timeout)?;
        let policy = RenewalPolicy {
            endpoint: auth.refresh_endpoint.clone(),
            retry_statuses: auth.retry_statuses.clone(),
        };

        tracing::debug!(base_url = %http.base_url(), "API client ready");
        Ok(Self::with_transport(SessionRenewal::new(http, policy)))
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Send a request and return the decoded body, or `None` when the
    /// backend answered without one.
    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
    ) -> GatewayResult<Option<Value>> {
        let descriptor = RequestDescriptor {
            endpoint: endpoint.to_string(),
            method,
            body,
        };
        self.execute(&descriptor).await
    }

    pub async fn execute(&self, descriptor: &RequestDescriptor) -> GatewayResult<Option<Value>> {
        let response = self.send_raw(descriptor).await?;
        interpret_response(response)
    }

    async fn send_raw(&self, descriptor: &RequestDescriptor) -> GatewayResult<RawResponse> {
        let request_id = uuid::Uuid::new_v4();
        tracing::debug!(
            request_id = %request_id,
            method = %descriptor.method,
            endpoint = %descriptor.endpoint,
            "Sending request"
        );

        let response = self.transport.send(descriptor).await?;

        tracing::debug!(
            request_id = %request_id,
            status = response.status,
            "Received response"
        );
        Ok(response)
    }

    /// GET and decode into `R`
    pub async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> GatewayResult<R> {
        let value = self.request(endpoint, Method::Get, None).await?;
        decode(value)
    }

    /// Send a serializable body and decode the answer into `R`
    pub async fn send_json<B, R>(&self, endpoint: &str, method: Method, body: &B) -> GatewayResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let value = self.request(endpoint, method, Some(body)).await?;
        decode(value)
    }

    /// Send without a body and check only the status. A 2xx body is never
    /// parsed, so plain-text acknowledgements count as success.
    pub async fn call(&self, endpoint: &str, method: Method) -> GatewayResult<()> {
        let response = self
            .send_raw(&RequestDescriptor::new(endpoint, method))
            .await?;
        check_status(&response)
    }
}

/// An empty result decodes as JSON `null`, so `Option<R>` targets accept it.
fn decode<R: DeserializeOwned>(value: Option<Value>) -> GatewayResult<R> {
    Ok(serde_json::from_value(value.unwrap_or(Value::Null))?)
}

/// Turn a raw response into the gateway's result.
///
/// Failure statuses are checked before the empty-body cases, so a non-2xx
/// response never yields an empty success.
pub fn interpret_response(response: RawResponse) -> GatewayResult<Option<Value>> {
    check_status(&response)?;

    if response.has_no_content() || response.body.is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(&response.body)?))
}

/// `RequestFailed` for any non-2xx status, body untouched otherwise
pub fn check_status(response: &RawResponse) -> GatewayResult<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(GatewayError::RequestFailed {
        status: response.status,
        message: error_message(response.status, &response.body),
    })
}

/// Pull `error`, then `message`, out of a JSON error body
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message"].iter().find_map(|key| {
                v.get(*key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| GatewayError::status_message(status))
}
