//! Route Guards
//!
//! Two composable checks applied before a protected view renders:
//! - [`SessionGuard`]: confirms the session is live through the gateway
//! - [`RoleGuard`]: compares the stored role claim with an allow-list
//!
//! Guards only decide. They return a [`GuardDecision`] and the router
//! performs the navigation.
//!
//! The role check is a convenience for the user interface. The claim sits
//! in client-controlled storage, so the backend must authorize every call
//! on its own.

mod role;
mod session;

pub use role::RoleGuard;
pub use session::{MountedGuard, SessionGuard};

use serde::{Deserialize, Serialize};

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    /// Replace the current location with this path
    Redirect(String),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allowed)
    }
}

/// State carried by the navigation that reached a guard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Location the user was redirected from, if the navigation said so
    pub from: Option<String>,
}

impl NavigationState {
    pub fn from_location(path: impl Into<String>) -> Self {
        Self {
            from: Some(path.into()),
        }
    }
}

/// States of the combined guard pair.
///
/// ```text
/// CheckingSession ─┬─ SessionOk ── CheckingRole ─┬─ RoleOk ── RenderPage
///                  │                              └─ RoleDenied ── RedirectFallback
///                  └─ SessionFailed ── RedirectLogin
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardState {
    CheckingSession,
    SessionOk,
    SessionFailed,
    CheckingRole,
    RoleOk,
    RoleDenied,
    RenderPage,
    RedirectFallback,
    RedirectLogin,
}

impl GuardState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GuardState::RenderPage | GuardState::RedirectFallback | GuardState::RedirectLogin
        )
    }

    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(&self, next: GuardState) -> bool {
        use GuardState::*;
        matches!(
            (self, next),
            (CheckingSession, SessionOk)
                | (CheckingSession, SessionFailed)
                | (SessionOk, CheckingRole)
                | (SessionOk, RenderPage)
                | (CheckingRole, RoleOk)
                | (CheckingRole, RoleDenied)
                | (RoleOk, RenderPage)
                | (RoleDenied, RedirectFallback)
                | (SessionFailed, RedirectLogin)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(GuardState::RenderPage.is_terminal());
        assert!(GuardState::RedirectLogin.is_terminal());
        assert!(GuardState::RedirectFallback.is_terminal());
        assert!(!GuardState::CheckingSession.is_terminal());
        assert!(!GuardState::RoleDenied.is_terminal());
    }

    #[test]
    fn test_transitions() {
        assert!(GuardState::CheckingSession.can_transition_to(GuardState::SessionFailed));
        assert!(GuardState::RoleDenied.can_transition_to(GuardState::RedirectFallback));
        assert!(!GuardState::CheckingSession.can_transition_to(GuardState::RenderPage));
        assert!(!GuardState::SessionFailed.can_transition_to(GuardState::CheckingRole));
        assert!(!GuardState::RenderPage.can_transition_to(GuardState::CheckingSession));
    }
}
