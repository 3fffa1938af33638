use serde::{Deserialize, Serialize};

use super::{ListParams, PageOf};
use crate::gateway::{ApiClient, GatewayResult, Method};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub product_code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Entry of the active-products picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub product_code: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub product_code: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock_quantity: i64,
}

pub async fn list(client: &ApiClient, params: &ListParams) -> GatewayResult<PageOf<Product>> {
    client.get(&params.to_query().append_to("products")).await
}

pub async fn get(client: &ApiClient, id: u64) -> GatewayResult<Product> {
    client.get(&format!("products/{}", id)).await
}

pub async fn active(client: &ApiClient) -> GatewayResult<Vec<ProductOption>> {
    client
        .get::<Option<Vec<ProductOption>>>("products/active")
        .await
        .map(Option::unwrap_or_default)
}

pub async fn create(client: &ApiClient, form: &ProductForm) -> GatewayResult<Option<Product>> {
    client.send_json("products", Method::Post, form).await
}

pub async fn update(client: &ApiClient, id: u64, form: &ProductForm) -> GatewayResult<Option<Product>> {
    client
        .send_json(&format!("products/{}", id), Method::Put, form)
        .await
}

pub async fn delete(client: &ApiClient, id: u64) -> GatewayResult<()> {
    client.call(&format!("products/{}", id), Method::Delete).await
}

/// Order total for a set of `(product code, quantity)` lines; unknown
/// codes count as zero.
pub fn order_total(options: &[ProductOption], lines: &[(String, u32)]) -> f64 {
    lines
        .iter()
        .map(|(code, qty)| {
            options
                .iter()
                .find(|p| &p.product_code == code)
                .and_then(|p| p.price)
                .unwrap_or(0.0)
                * f64::from(*qty)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{client_with, ok};

    #[tokio::test]
    async fn test_active_products() {
        let (client, scripted) = client_with(vec![ok(
            r#"[{"productCode":"WID-1","name":"Widget","price":2.5},{"productCode":"GAD-9","name":"Gadget"}]"#,
        )]);

        let options = active(&client).await.unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].price, None);
        assert_eq!(scripted.endpoints(), vec!["products/active"]);
    }

    #[tokio::test]
    async fn test_active_products_empty_body() {
        let (client, _) = client_with(vec![ok("")]);
        assert!(active(&client).await.unwrap().is_empty());
    }

    #[test]
    fn test_order_total() {
        let options = vec![
            ProductOption { product_code: "A".into(), name: "a".into(), price: Some(2.5) },
            ProductOption { product_code: "B".into(), name: "b".into(), price: None },
        ];
        let lines = vec![("A".to_string(), 4), ("B".to_string(), 1), ("Z".to_string(), 9)];
        assert_eq!(order_total(&options, &lines), 10.0);
    }
}
