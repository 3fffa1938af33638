//! Calendar reminders (the backend calls them todos).
//!
//! Dates are kept as the backend sends them: local date-times without a
//! zone, minute precision allowed.

use serde::{Deserialize, Serialize};

use crate::gateway::{ApiClient, GatewayResult, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    #[default]
    LeadFollowUp,
    ContactCustomer,
    UpdateSales,
    ProductCheck,
    OrderLookup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub event_type: EventType,
}

/// `completed` is only sent on update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderForm {
    pub title: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub all_day: bool,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

pub async fn list(client: &ApiClient) -> GatewayResult<Vec<Reminder>> {
    client
        .get::<Option<Vec<Reminder>>>("todos")
        .await
        .map(Option::unwrap_or_default)
}

pub async fn create(client: &ApiClient, form: &ReminderForm) -> GatewayResult<Option<Reminder>> {
    client.send_json("todos", Method::Post, form).await
}

pub async fn update(client: &ApiClient, id: u64, form: &ReminderForm) -> GatewayResult<Option<Reminder>> {
    client.send_json(&format!("todos/{}", id), Method::Put, form).await
}

pub async fn delete(client: &ApiClient, id: u64) -> GatewayResult<()> {
    client.call(&format!("todos/{}", id), Method::Delete).await
}
