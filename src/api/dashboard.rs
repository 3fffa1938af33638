//! Dashboard figures and the analyst report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::leads::LeadStatus;
use super::QueryString;
use crate::gateway::{ApiClient, GatewayError, GatewayResult};

/// Headline counts for the landing dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_leads: u64,
    pub converted_leads: u64,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub total_products: u64,
    pub active_products: u64,
    pub total_orders: u64,
    pub active_orders: u64,
    pub added_customers: u64,
    pub removed_customers: u64,
}

impl DashboardStats {
    /// Whole-number conversion percentage, 0 with no leads
    pub fn lead_conversion_percent(&self) -> u64 {
        if self.total_leads == 0 {
            return 0;
        }
        ((self.converted_leads as f64 / self.total_leads as f64) * 100.0).round() as u64
    }

    pub fn pending_leads(&self) -> u64 {
        self.total_leads.saturating_sub(self.converted_leads)
    }

    pub fn pending_tasks(&self) -> u64 {
        self.total_tasks.saturating_sub(self.completed_tasks)
    }

    pub fn inactive_products(&self) -> u64 {
        self.total_products.saturating_sub(self.active_products)
    }
}

pub async fn stats(client: &ApiClient) -> GatewayResult<DashboardStats> {
    client
        .get::<Option<DashboardStats>>("dashboard/stats")
        .await
        .map(Option::unwrap_or_default)
}

/// Filters of the analyst report
#[derive(Debug, Clone, PartialEq)]
pub struct AnalystQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub top_product_limit: u32,
    pub sales_rep_id: Option<u64>,
    pub product_id: Option<u64>,
    pub lead_status: Option<LeadStatus>,
}

impl AnalystQuery {
    /// Single-day report with the default top-5 product limit
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            start_date: day,
            end_date: day,
            top_product_limit: 5,
            sales_rep_id: None,
            product_id: None,
            lead_status: None,
        }
    }

    pub fn endpoint(&self) -> Result<String, AnalystQueryError> {
        if self.start_date > self.end_date {
            return Err(AnalystQueryError::InvertedRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        Ok(QueryString::new()
            .param("startDate", self.start_date.format("%Y-%m-%d"))
            .param("endDate", self.end_date.format("%Y-%m-%d"))
            .param("topProductLimit", self.top_product_limit)
            .opt("salesRepId", self.sales_rep_id)
            .opt("productId", self.product_id)
            .opt("leadStatus", self.lead_status)
            .append_to("analyst/dashboard"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalystQueryError {
    #[error("Start date {start} cannot be after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// The analyst report is chart data whose shape belongs to the backend,
/// so it is returned as raw JSON (`Null` when empty).
pub async fn analyst_report(client: &ApiClient, query: &AnalystQuery) -> Result<Value, AnalystQueryError> {
    let endpoint = query.endpoint()?;
    Ok(client.get::<Value>(&endpoint).await?)
}
