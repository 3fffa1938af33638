//! Request Gateway
//!
//! Uniform access to the Engage X backend:
//! - [`Transport`]: one raw HTTP round trip ([`HttpTransport`] in production)
//! - [`SessionRenewal`]: renew the session once on 401/403 and replay once
//! - [`ApiClient`]: JSON in, JSON (or nothing) out, errors as [`GatewayError`]

mod client;
mod error;
mod renewal;
mod request;
mod transport;

pub use client::{check_status, error_message, interpret_response, ApiClient};
pub use error::{GatewayError, GatewayResult, SESSION_EXPIRED_MESSAGE};
pub use renewal::{RenewalPolicy, SessionRenewal};
pub use request::{Method, RawResponse, RequestDescriptor};
pub use transport::{normalize_base_url, HttpTransport, Transport};

#[cfg(test)]
pub(crate) use renewal::tests::ScriptedTransport;
