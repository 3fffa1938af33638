//! Console Router
//!
//! Route table of the console and the guard pipeline in front of it. A
//! navigation runs the session guard, then the role guard (if the route has
//! an allow-list), and resolves to a page to render or a redirect.
//!
//! Dropping a pending [`Router::navigate`] future abandons the check
//! without any navigation taking place.

use serde::Serialize;

use crate::config::RoutesConfig;
use crate::guard::{GuardDecision, GuardState, NavigationState, RoleGuard, SessionGuard};
use crate::session::{Role, SessionContext};

/// Views the console can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PageKind {
    Landing,
    Login,
    Dashboard,
    Profile,
    Users,
    UserView,
    Customers,
    CustomerView,
    Leads,
    LeadView,
    Products,
    Analyst,
    NotFound,
}

/// Who may open a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Roles(Vec<Role>),
}

#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: String,
    pub kind: PageKind,
    pub access: Access,
}

impl Route {
    pub fn new(pattern: impl Into<String>, kind: PageKind, access: Access) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
            access,
        }
    }

    /// Match a path against the pattern, capturing `:name` segments
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let pattern: Vec<&str> = split_path(&self.pattern).collect();
        let segments: Vec<&str> = split_path(path).collect();
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (p, s) in pattern.iter().zip(segments.iter()) {
            if let Some(name) = p.strip_prefix(':') {
                params.push((name.to_string(), s.to_string()));
            } else if p != s {
                return None;
            }
        }
        Some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A resolved view and its path parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub kind: PageKind,
    pub params: Vec<(String, String)>,
}

impl Page {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Render(Page),
    Redirect(String),
}

/// Result of one navigation, with the guard states it passed through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub outcome: Outcome,
    pub trace: Vec<GuardState>,
}

/// Sidebar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub label: &'static str,
    pub path: &'static str,
}

/// Routes reachable by admins only
pub fn admin_roles() -> Vec<Role> {
    vec![Role::Admin, Role::SuperAdmin]
}

/// Routes for the sales floor
pub fn sales_roles() -> Vec<Role> {
    vec![Role::SalesRep, Role::Admin, Role::SuperAdmin]
}

/// Routes for the analytics view
pub fn analyst_roles() -> Vec<Role> {
    vec![Role::Analyst, Role::Admin, Role::SuperAdmin]
}

/// The console's route table
pub fn default_routes() -> Vec<Route> {
    use Access::*;
    use PageKind::*;

    vec![
        Route::new("/", Landing, Public),
        Route::new("/login", Login, Public),
        Route::new("/dashboard", Dashboard, Authenticated),
        Route::new("/profile", Profile, Authenticated),
        Route::new("/users", Users, Roles(admin_roles())),
        Route::new("/viewUser/:id", UserView, Roles(admin_roles())),
        Route::new("/customers", Customers, Roles(sales_roles())),
        Route::new("/viewCustomer/:id", CustomerView, Roles(sales_roles())),
        Route::new("/leads", Leads, Roles(sales_roles())),
        Route::new("/viewLead/:id", LeadView, Roles(sales_roles())),
        Route::new("/products", Products, Roles(sales_roles())),
        Route::new("/analyst", Analyst, Roles(analyst_roles())),
    ]
}

pub struct Router {
    routes: Vec<Route>,
    session_guard: SessionGuard,
    session: SessionContext,
    default_landing: String,
}

impl Router {
    pub fn new(session_guard: SessionGuard, session: SessionContext, config: &RoutesConfig) -> Self {
        Self::with_routes(default_routes(), session_guard, session, config)
    }

    pub fn with_routes(
        routes: Vec<Route>,
        session_guard: SessionGuard,
        session: SessionContext,
        config: &RoutesConfig,
    ) -> Self {
        Self {
            routes,
            session_guard,
            session,
            default_landing: config.default_landing.clone(),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route matching the path; a query string is ignored
    pub fn resolve(&self, path: &str) -> Option<(&Route, Page)> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        self.routes.iter().find_map(|route| {
            route.matches(path).map(|params| {
                (
                    route,
                    Page {
                        kind: route.kind,
                        params,
                    },
                )
            })
        })
    }

    pub async fn navigate(&self, path: &str, nav: &NavigationState) -> Navigation {
        let Some((route, page)) = self.resolve(path) else {
            return Navigation {
                outcome: Outcome::Render(Page {
                    kind: PageKind::NotFound,
                    params: Vec::new(),
                }),
                trace: Vec::new(),
            };
        };

        if route.access == Access::Public {
            return Navigation {
                outcome: Outcome::Render(page),
                trace: Vec::new(),
            };
        }

        let mut trace = vec![GuardState::CheckingSession];

        if let GuardDecision::Redirect(target) = self.session_guard.check().await {
            trace.extend([GuardState::SessionFailed, GuardState::RedirectLogin]);
            tracing::warn!(path = %path, redirect = %target, "Not authenticated");
            return Navigation {
                outcome: Outcome::Redirect(target),
                trace,
            };
        }
        trace.push(GuardState::SessionOk);

        let allowed = match &route.access {
            Access::Roles(roles) => roles.clone(),
            _ => {
                trace.push(GuardState::RenderPage);
                return Navigation {
                    outcome: Outcome::Render(page),
                    trace,
                };
            }
        };

        trace.push(GuardState::CheckingRole);
        let role_guard = RoleGuard::new(allowed, self.default_landing.clone());
        match role_guard.check(&self.session, nav) {
            GuardDecision::Allowed => {
                trace.extend([GuardState::RoleOk, GuardState::RenderPage]);
                Navigation {
                    outcome: Outcome::Render(page),
                    trace,
                }
            }
            GuardDecision::Redirect(target) => {
                trace.extend([GuardState::RoleDenied, GuardState::RedirectFallback]);
                tracing::warn!(path = %path, redirect = %target, "Role not permitted");
                Navigation {
                    outcome: Outcome::Redirect(target),
                    trace,
                }
            }
        }
    }

    /// Sidebar sections for the current role claim
    pub fn sections(role: Option<&Role>) -> Vec<Section> {
        let mut sections = vec![
            Section { label: "Dashboard", path: "/dashboard" },
            Section { label: "Customers", path: "/customers" },
            Section { label: "Leads", path: "/leads" },
            Section { label: "Products", path: "/products" },
        ];

        if role.map(Role::is_admin).unwrap_or(false) {
            sections.push(Section { label: "Users", path: "/users" });
        }
        if role.map(|r| analyst_roles().contains(r)).unwrap_or(false) {
            sections.push(Section { label: "Analyst", path: "/analyst" });
        }

        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{
        ApiClient, GatewayResult, RawResponse, RenewalPolicy, ScriptedTransport, SessionRenewal,
    };
    use std::sync::Arc;

    fn router(
        responses: Vec<GatewayResult<RawResponse>>,
        role: Option<Role>,
    ) -> (Router, Arc<ScriptedTransport>) {
        let scripted = Arc::new(ScriptedTransport::new(responses));
        let client = ApiClient::with_transport(SessionRenewal::new(
            scripted.clone(),
            RenewalPolicy::default(),
        ));
        let session = SessionContext::in_memory();
        if let Some(role) = role {
            session.record_login("user@engagex.io", &role).unwrap();
        }
        let guard = SessionGuard::new(client, "auth/validate", "/login");
        (
            Router::new(guard, session, &RoutesConfig::default()),
            scripted,
        )
    }

    #[test]
    fn test_route_matching() {
        let route = Route::new("/viewCustomer/:id", PageKind::CustomerView, Access::Authenticated);
        assert_eq!(
            route.matches("/viewCustomer/42"),
            Some(vec![("id".to_string(), "42".to_string())])
        );
        assert_eq!(route.matches("/viewCustomer"), None);
        assert_eq!(route.matches("/viewLead/42"), None);

        let root = Route::new("/", PageKind::Landing, Access::Public);
        assert_eq!(root.matches("/"), Some(vec![]));
        assert_eq!(root.matches("/x"), None);
    }

    #[tokio::test]
    async fn test_public_route_skips_guards() {
        let (router, scripted) = router(vec![], None);
        let nav = router.navigate("/login", &NavigationState::default()).await;

        assert!(matches!(nav.outcome, Outcome::Render(Page { kind: PageKind::Login, .. })));
        assert!(nav.trace.is_empty());
        assert!(scripted.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (router, _) = router(vec![], None);
        let nav = router.navigate("/nowhere", &NavigationState::default()).await;
        assert!(matches!(nav.outcome, Outcome::Render(Page { kind: PageKind::NotFound, .. })));
    }

    #[tokio::test]
    async fn test_expired_session_redirects_to_login() {
        let (router, _) = router(
            vec![Ok(RawResponse::new(401, "")), Ok(RawResponse::new(401, ""))],
            Some(Role::Admin),
        );
        let nav = router.navigate("/users", &NavigationState::default()).await;

        assert_eq!(nav.outcome, Outcome::Redirect("/login".to_string()));
        assert_eq!(
            nav.trace,
            vec![
                GuardState::CheckingSession,
                GuardState::SessionFailed,
                GuardState::RedirectLogin
            ]
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_redirects_logged_as_warnings() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let (expired, _) = router(
            vec![Ok(RawResponse::new(401, "")), Ok(RawResponse::new(401, ""))],
            Some(Role::Admin),
        );
        expired.navigate("/users", &NavigationState::default()).await;

        let (rep, _) = router(vec![Ok(RawResponse::new(200, ""))], Some(Role::SalesRep));
        rep.navigate("/users", &NavigationState::default()).await;

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("Not authenticated"));
        assert!(output.contains("Role not permitted"));
    }

    #[tokio::test]
    async fn test_sales_rep_cannot_open_users() {
        let (router, _) = router(vec![Ok(RawResponse::new(200, ""))], Some(Role::SalesRep));
        let nav = router.navigate("/users", &NavigationState::default()).await;

        assert_eq!(nav.outcome, Outcome::Redirect("/dashboard".to_string()));
        assert_eq!(
            nav.trace,
            vec![
                GuardState::CheckingSession,
                GuardState::SessionOk,
                GuardState::CheckingRole,
                GuardState::RoleDenied,
                GuardState::RedirectFallback
            ]
        );
    }

    #[tokio::test]
    async fn test_allowed_view_renders_with_params() {
        let (router, _) = router(vec![Ok(RawResponse::new(200, ""))], Some(Role::SalesRep));
        let nav = router
            .navigate("/viewCustomer/7?tab=orders", &NavigationState::default())
            .await;

        match nav.outcome {
            Outcome::Render(page) => {
                assert_eq!(page.kind, PageKind::CustomerView);
                assert_eq!(page.param("id"), Some("7"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(nav.trace.last(), Some(&GuardState::RenderPage));
        for pair in nav.trace.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]));
        }
    }

    #[tokio::test]
    async fn test_authenticated_route_needs_no_role() {
        let (router, _) = router(vec![Ok(RawResponse::new(200, ""))], None);
        let nav = router.navigate("/dashboard", &NavigationState::default()).await;

        assert!(matches!(nav.outcome, Outcome::Render(Page { kind: PageKind::Dashboard, .. })));
        assert_eq!(
            nav.trace,
            vec![
                GuardState::CheckingSession,
                GuardState::SessionOk,
                GuardState::RenderPage
            ]
        );
    }

    #[tokio::test]
    async fn test_denied_role_returns_to_origin() {
        let (router, _) = router(vec![Ok(RawResponse::new(200, ""))], Some(Role::Analyst));
        let nav = router
            .navigate("/customers", &NavigationState::from_location("/analyst"))
            .await;
        assert_eq!(nav.outcome, Outcome::Redirect("/analyst".to_string()));
    }

    #[test]
    fn test_sections_by_role() {
        let labels = |role: Option<Role>| -> Vec<&'static str> {
            Router::sections(role.as_ref())
                .into_iter()
                .map(|s| s.label)
                .collect()
        };

        assert_eq!(
            labels(Some(Role::SalesRep)),
            vec!["Dashboard", "Customers", "Leads", "Products"]
        );
        assert_eq!(
            labels(Some(Role::Analyst)),
            vec!["Dashboard", "Customers", "Leads", "Products", "Analyst"]
        );
        assert_eq!(
            labels(Some(Role::SuperAdmin)),
            vec!["Dashboard", "Customers", "Leads", "Products", "Users", "Analyst"]
        );
        assert_eq!(labels(None).len(), 4);
    }
}
