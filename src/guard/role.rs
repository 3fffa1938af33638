use super::{GuardDecision, NavigationState};
use crate::session::{Role, SessionContext};

/// Allow-list check against the stored role claim. No network call.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Vec<Role>,
    default_fallback: String,
}

impl RoleGuard {
    pub fn new(allowed: Vec<Role>, default_fallback: impl Into<String>) -> Self {
        Self {
            allowed,
            default_fallback: default_fallback.into(),
        }
    }

    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }

    pub fn check(&self, session: &SessionContext, nav: &NavigationState) -> GuardDecision {
        self.check_claim(session.role().as_ref(), nav)
    }

    /// A missing claim, or one not on the list, is denied rather than
    /// treated as an error.
    pub fn check_claim(&self, claim: Option<&Role>, nav: &NavigationState) -> GuardDecision {
        match claim {
            Some(role) if self.allowed.contains(role) => GuardDecision::Allowed,
            _ => {
                let target = nav
                    .from
                    .clone()
                    .unwrap_or_else(|| self.default_fallback.clone());
                tracing::debug!(
                    claim = ?claim.map(Role::as_str),
                    redirect = %target,
                    "Role not permitted"
                );
                GuardDecision::Redirect(target)
            }
        }
    }
}
