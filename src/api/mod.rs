//! Backend Resources
//!
//! Typed wrappers over [`ApiClient`](crate::gateway::ApiClient) for each
//! resource the console works with. They build endpoint paths and query
//! strings and decode the backend's camelCase JSON; all error handling is
//! the gateway's.

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod interactions;
pub mod leads;
pub mod orders;
pub mod products;
pub mod reminders;
pub mod tasks;
pub mod users;

use serde::{Deserialize, Serialize};

/// One page of a paged listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOf<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

/// Paging and filtering shared by the listing endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub size: u32,
    pub search: Option<String>,
    pub active: Option<bool>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            search: None,
            active: None,
        }
    }
}

impl ListParams {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.is_empty() { None } else { Some(search) };
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub(crate) fn to_query(&self) -> QueryString {
        QueryString::new()
            .param("page", self.page)
            .param("size", self.size)
            .opt("search", self.search.as_ref())
            .opt("active", self.active)
    }
}

/// `application/x-www-form-urlencoded` query builder
#[derive(Debug, Clone, Default)]
pub(crate) struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Append to a path, adding `?` only when there is something to add
    pub(crate) fn append_to(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            return path.to_string();
        }
        let query = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", path, query)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::gateway::{
        ApiClient, GatewayResult, RawResponse, RenewalPolicy, ScriptedTransport, SessionRenewal,
    };
    use std::sync::Arc;

    pub(crate) fn client_with(
        responses: Vec<GatewayResult<RawResponse>>,
    ) -> (ApiClient, Arc<ScriptedTransport>) {
        let scripted = Arc::new(ScriptedTransport::new(responses));
        let client = ApiClient::with_transport(SessionRenewal::new(
            scripted.clone(),
            RenewalPolicy::default(),
        ));
        (client, scripted)
    }

    pub(crate) fn ok(body: &str) -> GatewayResult<RawResponse> {
        Ok(RawResponse::new(200, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_query() {
        let params = ListParams::default().page(2).search("acme corp").active(true);
        assert_eq!(
            params.to_query().append_to("customers"),
            "customers?page=2&size=10&search=acme%20corp&active=true"
        );
        assert_eq!(
            ListParams::default().search("").to_query().append_to("leads"),
            "leads?page=0&size=10"
        );
    }

    #[test]
    fn test_empty_query_leaves_path() {
        assert_eq!(QueryString::new().append_to("todos"), "todos");
    }

    #[test]
    fn test_page_of_defaults() {
        let page: PageOf<u32> = serde_json::from_str(r#"{"content":[1,2]}"#).unwrap();
        assert_eq!(page.content, vec![1, 2]);
        assert_eq!(page.total_pages, 0);
    }
}
