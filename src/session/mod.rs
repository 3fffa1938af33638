//! Client Session State
//!
//! The only client-held session state is two strings, `email` and `role`,
//! written at login and cleared at logout. The session cookie itself is
//! owned by the HTTP transport and never read here.
//!
//! [`SessionContext`] is passed explicitly to whatever needs it; the
//! backing [`SessionStore`] is injected so tests can use [`MemoryStore`].

mod role;
mod store;

pub use role::Role;
pub use store::{FileStore, MemoryStore, SessionStore};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{SessionConfig, SessionStoreKind};

pub const EMAIL_KEY: &str = "email";
pub const ROLE_KEY: &str = "role";

/// Session storage errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to write session file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to serialize session: {0}")]
    Serialize(String),
}

/// Read/write access to the persisted email and role claim
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("email", &self.email())
            .field("role", &self.role_claim())
            .finish()
    }
}

impl SessionContext {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        match config.store {
            SessionStoreKind::Memory => Self::in_memory(),
            SessionStoreKind::File => Self::new(FileStore::open(config.resolved_path())),
        }
    }

    pub fn email(&self) -> Option<String> {
        self.store.load(EMAIL_KEY)
    }

    /// The raw claim exactly as stored
    pub fn role_claim(&self) -> Option<String> {
        self.store.load(ROLE_KEY)
    }

    pub fn role(&self) -> Option<Role> {
        self.role_claim().map(Role::from)
    }

    /// Persist what the login response returned. Overwrites any stale claim.
    pub fn record_login(&self, email: &str, role: &Role) -> Result<(), SessionError> {
        self.store.store(EMAIL_KEY, email)?;
        self.store.store(ROLE_KEY, role.as_str())?;
        tracing::info!(email = %email, role = %role, "Session recorded");
        Ok(())
    }

    /// Forget email and role. Both keys are attempted even if one fails.
    pub fn clear(&self) -> Result<(), SessionError> {
        let email = self.store.remove(EMAIL_KEY);
        let role = self.store.remove(ROLE_KEY);
        email.and(role)
    }
}
