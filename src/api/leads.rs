use serde::{Deserialize, Serialize};

use super::{ListParams, PageOf};
use crate::gateway::{ApiClient, GatewayResult, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Contacted => "CONTACTED",
            LeadStatus::Qualified => "QUALIFIED",
            LeadStatus::Converted => "CONVERTED",
            LeadStatus::Lost => "LOST",
        }
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown lead status: {}", s))
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub assigned_to_name: String,
    pub status: LeadStatus,
    pub active: bool,
}

pub async fn list(client: &ApiClient, params: &ListParams) -> GatewayResult<PageOf<Lead>> {
    client.get(&params.to_query().append_to("leads")).await
}

pub async fn get(client: &ApiClient, id: u64) -> GatewayResult<Lead> {
    client.get(&format!("leads/{}", id)).await
}

pub async fn create(client: &ApiClient, form: &LeadForm) -> GatewayResult<Option<Lead>> {
    client.send_json("leads", Method::Post, form).await
}

pub async fn update(client: &ApiClient, id: u64, form: &LeadForm) -> GatewayResult<Option<Lead>> {
    client.send_json(&format!("leads/{}", id), Method::Put, form).await
}

pub async fn soft_delete(client: &ApiClient, id: u64) -> GatewayResult<()> {
    client
        .call(&format!("leads/soft-delete/{}", id), Method::Patch)
        .await
}
