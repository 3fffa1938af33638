//! Login, logout and session validation.

use serde::{Deserialize, Serialize};

use crate::gateway::{ApiClient, GatewayError, GatewayResult, Method};
use crate::session::{Role, SessionContext};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// What the backend returns on a successful login
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub email: String,
    pub role: Role,
}

/// Errors from login beyond the gateway's own
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Login response was empty")]
    EmptyResponse,

    #[error(transparent)]
    Session(#[from] crate::session::SessionError),
}

/// Log in and persist the returned email and role claim. Nothing is
/// persisted when the call fails.
pub async fn login(
    client: &ApiClient,
    session: &SessionContext,
    email: &str,
    password: &str,
) -> Result<LoginResponse, AuthError> {
    let response: Option<LoginResponse> = client
        .send_json("auth/login", Method::Post, &LoginRequest { email, password })
        .await?;
    let response = response.ok_or(AuthError::EmptyResponse)?;

    session.record_login(&response.email, &response.role)?;
    tracing::info!(email = %response.email, role = %response.role, "Logged in");
    Ok(response)
}

/// Log out. The stored email and role are cleared whatever the backend
/// answers; the call's own error is still returned.
pub async fn logout(client: &ApiClient, session: &SessionContext) -> GatewayResult<()> {
    let result = client.call("auth/logout", Method::Post).await;
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Logout call failed");
    }

    if let Err(e) = session.clear() {
        tracing::warn!(error = %e, "Failed to clear stored session");
    }
    result
}

/// Probe the session at `endpoint`. Any 2xx counts as live; the body is
/// ignored.
pub async fn validate(client: &ApiClient, endpoint: &str) -> GatewayResult<()> {
    client.call(endpoint, Method::Get).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{client_with, ok};
    use crate::gateway::RawResponse;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_persists_claim() {
        let (client, scripted) = client_with(vec![ok(r#"{"email":"rep@engagex.io","role":"SALES_REP"}"#)]);
        let session = SessionContext::in_memory();

        let response = login(&client, &session, "rep@engagex.io", "hunter2").await.unwrap();
        assert_eq!(response.role, Role::SalesRep);
        assert_eq!(session.role(), Some(Role::SalesRep));
        assert_eq!(session.email().as_deref(), Some("rep@engagex.io"));

        let call = &scripted.calls()[0];
        assert_eq!(call.endpoint, "auth/login");
        assert_eq!(call.method, Method::Post);
        assert_eq!(
            call.body,
            Some(json!({"email": "rep@engagex.io", "password": "hunter2"}))
        );
    }

    #[tokio::test]
    async fn test_failed_login_persists_nothing() {
        let (client, _) = client_with(vec![
            Ok(RawResponse::new(401, r#"{"message":"Bad credentials"}"#)),
            Ok(RawResponse::new(401, "")),
        ]);
        let session = SessionContext::in_memory();

        let err = login(&client, &session, "x@y.z", "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::Gateway(GatewayError::SessionExpired)));
        assert_eq!(session.role(), None);
    }

    #[tokio::test]
    async fn test_validate_checks_status_only() {
        let (client, scripted) = client_with(vec![
            ok("Token is valid"),
            Ok(RawResponse::new(403, "")),
            Ok(RawResponse::new(500, "")),
        ]);

        validate(&client, "auth/validate").await.unwrap();
        let err = validate(&client, "auth/validate").await.unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(
            scripted.endpoints(),
            vec!["auth/validate", "auth/validate", "auth/refresh"]
        );
    }

    #[tokio::test]
    async fn test_logout_clears_even_on_failure() {
        let (client, _) = client_with(vec![Ok(RawResponse::new(500, ""))]);
        let session = SessionContext::in_memory();
        session.record_login("a@b.c", &Role::Admin).unwrap();

        let result = logout(&client, &session).await;
        assert!(result.is_err());
        assert_eq!(session.role(), None);
        assert_eq!(session.email(), None);
    }
}
