//! Authenticated-Session Guard
//!
//! Probes the validation endpoint through the gateway, so an expired
//! access token gets its one renewal attempt before the guard gives up.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{GuardDecision, GuardState};
use crate::api::auth;
use crate::config::Config;
use crate::gateway::ApiClient;

#[derive(Debug, Clone)]
pub struct SessionGuard {
    client: ApiClient,
    validate_endpoint: String,
    login_path: String,
}

impl SessionGuard {
    pub fn new(
        client: ApiClient,
        validate_endpoint: impl Into<String>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            validate_endpoint: validate_endpoint.into(),
            login_path: login_path.into(),
        }
    }

    pub fn from_config(client: ApiClient, config: &Config) -> Self {
        Self::new(
            client,
            config.auth.validate_endpoint.clone(),
            config.routes.login_path.clone(),
        )
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// One validation call. Every kind of failure, `SessionExpired`
    /// included, redirects to the login view; the reason is only logged.
    pub async fn check(&self) -> GuardDecision {
        match auth::validate(&self.client, &self.validate_endpoint).await {
            Ok(()) => GuardDecision::Allowed,
            Err(e) => {
                tracing::debug!(error = %e, "Session validation failed");
                GuardDecision::Redirect(self.login_path.clone())
            }
        }
    }

    /// Start a check in the background, the way a protected view does when
    /// it mounts. The returned handle reports `CheckingSession` until the
    /// probe settles on `SessionOk` or `SessionFailed`.
    ///
    /// Dropping or unmounting the handle before the probe settles discards
    /// its result: no state is published afterwards.
    pub fn mount(&self) -> MountedGuard {
        let (tx, rx) = watch::channel(GuardState::CheckingSession);
        let publisher = Arc::new(Mutex::new(Some(tx)));

        let guard = self.clone();
        let task_publisher = Arc::clone(&publisher);
        let task = tokio::spawn(async move {
            let next = match guard.check().await {
                GuardDecision::Allowed => GuardState::SessionOk,
                GuardDecision::Redirect(_) => GuardState::SessionFailed,
            };

            let slot = task_publisher
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match slot.as_ref() {
                Some(tx) => {
                    let _ = tx.send(next);
                }
                None => tracing::debug!("Discarding session check after unmount"),
            }
        });

        MountedGuard {
            state: rx,
            publisher,
            task,
            login_path: self.login_path.clone(),
        }
    }
}

/// Handle to an in-flight session check tied to a mounted view
#[derive(Debug)]
pub struct MountedGuard {
    state: watch::Receiver<GuardState>,
    publisher: Arc<Mutex<Option<watch::Sender<GuardState>>>>,
    task: JoinHandle<()>,
    login_path: String,
}

impl MountedGuard {
    pub fn state(&self) -> GuardState {
        *self.state.borrow()
    }

    /// Independent receiver for observers that outlive the handle
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.clone()
    }

    /// Wait for the probe to settle. Returns the last published state if
    /// the check was cancelled first.
    pub async fn settled(&mut self) -> GuardState {
        let waited = self
            .state
            .wait_for(|s| *s != GuardState::CheckingSession)
            .await
            .map(|state| *state);
        waited.unwrap_or_else(|_| *self.state.borrow())
    }

    /// What the view should do right now: `None` while checking
    pub fn decision(&self) -> Option<GuardDecision> {
        match self.state() {
            GuardState::SessionOk => Some(GuardDecision::Allowed),
            GuardState::SessionFailed => Some(GuardDecision::Redirect(self.login_path.clone())),
            _ => None,
        }
    }

    /// Tear down the view. Equivalent to dropping the handle.
    pub fn unmount(self) {}

    fn cancel(&self) {
        self.publisher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        self.task.abort();
    }
}

impl Drop for MountedGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}
