use serde::{Deserialize, Serialize};

use super::{ListParams, PageOf, QueryString};
use crate::gateway::{ApiClient, GatewayResult, Method};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub sales_rep_name: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Fields sent on create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerForm {
    pub name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub sales_rep_name: String,
}

pub async fn list(client: &ApiClient, params: &ListParams) -> GatewayResult<PageOf<Customer>> {
    client.get(&params.to_query().append_to("customers")).await
}

pub async fn get(client: &ApiClient, id: u64) -> GatewayResult<Customer> {
    client.get(&format!("customers/{}", id)).await
}

pub async fn create(client: &ApiClient, form: &CustomerForm) -> GatewayResult<Option<Customer>> {
    client.send_json("customers", Method::Post, form).await
}

pub async fn update(client: &ApiClient, id: u64, form: &CustomerForm) -> GatewayResult<Option<Customer>> {
    client
        .send_json(&format!("customers/{}", id), Method::Put, form)
        .await
}

/// Activate or deactivate a customer
pub async fn set_active(client: &ApiClient, id: u64, active: bool) -> GatewayResult<()> {
    let endpoint = QueryString::new()
        .param("active", active)
        .append_to(&format!("customers/{}", id));
    client.call(&endpoint, Method::Patch).await
}

/// Emails of active customers, for order forms
pub async fn active_emails(client: &ApiClient) -> GatewayResult<Vec<String>> {
    client
        .get::<Option<Vec<String>>>("customers/active-emails")
        .await
        .map(Option::unwrap_or_default)
}
