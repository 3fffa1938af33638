//! # Engage X
//!
//! Client-side core of the Engage X CRM console: a session-aware gateway to
//! the backend's REST API, route guards, and typed resource clients.
//!
//! ## Modules
//!
//! - [`gateway`]: one-shot session renewal and uniform error surfacing
//! - [`session`]: the persisted email and role claim
//! - [`guard`]: session and role guards, returning decisions instead of navigating
//! - [`router`]: route table and the guard pipeline in front of it
//! - [`api`]: customers, leads, orders, products, users, tasks, interactions,
//!   reminders and dashboards
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engagex::{api, ApiClient, Config, NavigationState, Router, SessionContext, SessionGuard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let client = ApiClient::connect(&config.api, &config.auth)?;
//!     let session = SessionContext::from_config(&config.session);
//!
//!     api::auth::login(&client, &session, "rep@engagex.io", "secret").await?;
//!
//!     let guard = SessionGuard::from_config(client.clone(), &config);
//!     let router = Router::new(guard, session, &config.routes);
//!     let nav = router.navigate("/customers", &NavigationState::default()).await;
//!     println!("{:?}", nav.outcome);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod gateway;
pub mod guard;
pub mod router;
pub mod session;

pub use config::{Config, ConfigError, LoggingConfig};

pub use gateway::{
    ApiClient, GatewayError, GatewayResult, HttpTransport, Method, RawResponse, RenewalPolicy,
    RequestDescriptor, SessionRenewal, Transport,
};

pub use guard::{GuardDecision, GuardState, MountedGuard, NavigationState, RoleGuard, SessionGuard};

pub use router::{Navigation, Outcome, Page, PageKind, Route, Router};

pub use session::{FileStore, MemoryStore, Role, SessionContext, SessionError, SessionStore};
