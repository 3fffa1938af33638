//! Gateway Error Types
//!
//! Every failure the gateway surfaces to callers. Guards treat all of them
//! alike; views show the message.

use thiserror::Error;

/// Message shown when the session could not be renewed
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Errors returned by [`ApiClient`](super::ApiClient) and its transports
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The renewal call failed after a 401/403; the caller should send the
    /// user back to the login view.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// Any other non-2xx outcome, carrying the best message available
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// Network unreachable, connection reset, timeout
    #[error("Network error: {0}")]
    Transport(String),

    /// Success status but the body was not JSON
    #[error("Parse error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Generic message used when the error body carries nothing useful
    pub fn status_message(status: u16) -> String {
        format!("Request failed with status {}", status)
    }

    /// HTTP status of a `RequestFailed`
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, GatewayError::SessionExpired)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e.to_string())
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
