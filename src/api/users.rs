use serde::{Deserialize, Serialize};

use super::{ListParams, PageOf, QueryString};
use crate::gateway::{ApiClient, GatewayResult, Method};
use crate::session::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Rejected before any call: the creator may not hand out this role
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("A {creator} cannot create a {requested} user")]
pub struct RoleNotAssignable {
    pub creator: String,
    pub requested: String,
}

impl UserForm {
    /// Check the requested role against what `creator` may assign
    pub fn check_assignable(&self, creator: &Role) -> Result<(), RoleNotAssignable> {
        if creator.assignable_roles().contains(&self.role) {
            Ok(())
        } else {
            Err(RoleNotAssignable {
                creator: creator.to_string(),
                requested: self.role.to_string(),
            })
        }
    }
}

pub async fn list(client: &ApiClient, params: &ListParams) -> GatewayResult<PageOf<User>> {
    client.get(&params.to_query().append_to("users")).await
}

pub async fn get(client: &ApiClient, id: u64) -> GatewayResult<User> {
    client.get(&format!("users/{}", id)).await
}

pub async fn create(client: &ApiClient, form: &UserForm) -> GatewayResult<Option<User>> {
    client.send_json("users", Method::Post, form).await
}

pub async fn deactivate(client: &ApiClient, id: u64) -> GatewayResult<()> {
    let endpoint = QueryString::new()
        .param("active", false)
        .append_to(&format!("users/{}", id));
    client.call(&endpoint, Method::Patch).await
}

/// Display names for assignment pickers
pub async fn names(client: &ApiClient) -> GatewayResult<Vec<String>> {
    client
        .get::<Option<Vec<String>>>("users/names")
        .await
        .map(Option::unwrap_or_default)
}

pub async fn active_emails(client: &ApiClient) -> GatewayResult<Vec<String>> {
    client
        .get::<Option<Vec<String>>>("users/active-emails")
        .await
        .map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{client_with, ok};

    fn form(role: Role) -> UserForm {
        UserForm {
            name: "New".into(),
            email: "new@engagex.io".into(),
            password: "pw".into(),
            role,
        }
    }

    #[test]
    fn test_admin_cannot_create_admin() {
        assert!(form(Role::Admin).check_assignable(&Role::Admin).is_err());
        assert!(form(Role::Admin).check_assignable(&Role::SuperAdmin).is_ok());
        assert!(form(Role::SuperAdmin).check_assignable(&Role::SuperAdmin).is_err());
        assert!(form(Role::Analyst).check_assignable(&Role::Admin).is_ok());
    }

    #[tokio::test]
    async fn test_user_role_decodes() {
        let (client, _) = client_with(vec![ok(
            r#"{"id":1,"name":"Ann","email":"ann@engagex.io","role":"ANALYST"}"#,
        )]);
        let user = get(&client, 1).await.unwrap();
        assert_eq!(user.role, Role::Analyst);
        assert!(user.active);
    }

    #[tokio::test]
    async fn test_deactivate_endpoint() {
        let (client, scripted) = client_with(vec![ok("")]);
        deactivate(&client, 12).await.unwrap();
        assert_eq!(scripted.endpoints(), vec!["users/12?active=false"]);
    }

    #[tokio::test]
    async fn test_pickers_tolerate_empty_body() {
        let (client, _) = client_with(vec![ok(""), ok("")]);
        assert!(active_emails(&client).await.unwrap().is_empty());
        assert!(names(&client).await.unwrap().is_empty());
    }
}
