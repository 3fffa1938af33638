//! Session Renewal
//!
//! Transport decorator that, when the backend answers with a retryable
//! status (401/403 by default), calls the renewal endpoint once and then
//! replays the original request once. It never loops: a second 401 on the
//! replay is handed back unchanged.

use async_trait::async_trait;

use super::error::{GatewayError, GatewayResult};
use super::request::{Method, RawResponse, RequestDescriptor};
use super::transport::Transport;

/// Where to renew and which statuses trigger it
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalPolicy {
    pub endpoint: String,
    pub retry_statuses: Vec<u16>,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            endpoint: "auth/refresh".to_string(),
            retry_statuses: vec![401, 403],
        }
    }
}

impl RenewalPolicy {
    pub fn should_renew(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }
}

/// Wraps a transport with the renew-and-replay-once policy
#[derive(Debug, Clone)]
pub struct SessionRenewal<T> {
    inner: T,
    policy: RenewalPolicy,
}

impl<T: Transport> SessionRenewal<T> {
    pub fn new(inner: T, policy: RenewalPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RenewalPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for SessionRenewal<T> {
    async fn send(&self, request: &RequestDescriptor) -> GatewayResult<RawResponse> {
        let response = self.inner.send(request).await?;
        if !self.policy.should_renew(response.status) {
            return Ok(response);
        }

        tracing::debug!(
            endpoint = %request.endpoint,
            status = response.status,
            "Access rejected, renewing session"
        );

        let renewal = RequestDescriptor::new(self.policy.endpoint.clone(), Method::Post);
        let renewed = self.inner.send(&renewal).await?;
        if !renewed.is_success() {
            tracing::warn!(
                endpoint = %request.endpoint,
                renewal_status = renewed.status,
                "Session renewal failed"
            );
            return Err(GatewayError::SessionExpired);
        }

        tracing::info!(endpoint = %request.endpoint, "Session renewed, replaying request");
        self.inner.send(request).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport answering from a fixed script and recording every call
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<GatewayResult<RawResponse>>>,
        calls: Mutex<Vec<RequestDescriptor>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(responses: Vec<GatewayResult<RawResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<RequestDescriptor> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn endpoints(&self) -> Vec<String> {
            self.calls().into_iter().map(|c| c.endpoint).collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &RequestDescriptor) -> GatewayResult<RawResponse> {
            self.calls.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    fn renewal(responses: Vec<GatewayResult<RawResponse>>) -> SessionRenewal<ScriptedTransport> {
        SessionRenewal::new(ScriptedTransport::new(responses), RenewalPolicy::default())
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let gateway = renewal(vec![Ok(RawResponse::new(200, "[]"))]);
        let response = gateway
            .send(&RequestDescriptor::get("customers"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(gateway.inner().endpoints(), vec!["customers"]);
    }

    #[tokio::test]
    async fn test_forbidden_renews_and_replays_once() {
        let gateway = renewal(vec![
            Ok(RawResponse::new(403, "")),
            Ok(RawResponse::new(200, "")),
            Ok(RawResponse::new(200, r#"{"id":5,"name":"Acme"}"#)),
        ]);
        let original = RequestDescriptor::new("orders", Method::Post).body(json!({"items": []}));

        let response = gateway.send(&original).await.unwrap();
        assert_eq!(response.body, r#"{"id":5,"name":"Acme"}"#);

        let calls = gateway.inner().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], original);
        assert_eq!(calls[1].endpoint, "auth/refresh");
        assert_eq!(calls[1].method, Method::Post);
        assert_eq!(calls[1].body, None);
        assert_eq!(calls[2], original);
    }

    #[tokio::test]
    async fn test_failed_renewal_is_session_expired() {
        let gateway = renewal(vec![
            Ok(RawResponse::new(401, "")),
            Ok(RawResponse::new(401, r#"{"error":"refresh token revoked"}"#)),
        ]);

        let err = gateway
            .send(&RequestDescriptor::get("customers/5"))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::SessionExpired);
        assert_eq!(
            gateway.inner().endpoints(),
            vec!["customers/5", "auth/refresh"]
        );
    }

    #[tokio::test]
    async fn test_replay_rejection_is_not_renewed_again() {
        let gateway = renewal(vec![
            Ok(RawResponse::new(401, "")),
            Ok(RawResponse::new(204, "")),
            Ok(RawResponse::new(401, r#"{"message":"still no"}"#)),
        ]);

        let response = gateway
            .send(&RequestDescriptor::get("users"))
            .await
            .unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(gateway.inner().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_renewal_transport_failure_propagates() {
        let gateway = renewal(vec![
            Ok(RawResponse::new(401, "")),
            Err(GatewayError::Transport("connection reset".into())),
        ]);

        let err = gateway
            .send(&RequestDescriptor::get("leads"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn test_custom_policy_statuses() {
        let policy = RenewalPolicy {
            endpoint: "session/renew".to_string(),
            retry_statuses: vec![419],
        };
        let gateway = SessionRenewal::new(
            ScriptedTransport::new(vec![Ok(RawResponse::new(403, ""))]),
            policy.clone(),
        );

        let response = gateway.send(&RequestDescriptor::get("x")).await.unwrap();
        assert_eq!(response.status, 403);
        assert!(policy.should_renew(419));
        assert!(!policy.should_renew(401));
    }
}
