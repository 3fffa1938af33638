use serde::{Deserialize, Serialize};

use crate::gateway::{ApiClient, GatewayResult, Method};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_code: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
}

impl OrderItem {
    pub fn new(product_code: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_code: product_code.into(),
            quantity,
            product_name: None,
            unit_price: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub created_by_username: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub order_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    pub customer_email: String,
    pub created_by_username: String,
    pub items: Vec<OrderItem>,
}

pub async fn for_customer(client: &ApiClient, customer_id: u64) -> GatewayResult<Vec<Order>> {
    client
        .get::<Option<Vec<Order>>>(&format!("orders/customer/{}", customer_id))
        .await
        .map(Option::unwrap_or_default)
}

pub async fn get(client: &ApiClient, id: u64) -> GatewayResult<Order> {
    client.get(&format!("orders/{}", id)).await
}

pub async fn create(client: &ApiClient, form: &OrderForm) -> GatewayResult<Option<Order>> {
    client.send_json("orders", Method::Post, form).await
}

pub async fn update(client: &ApiClient, id: u64, form: &OrderForm) -> GatewayResult<Option<Order>> {
    client.send_json(&format!("orders/{}", id), Method::Put, form).await
}

pub async fn delete(client: &ApiClient, id: u64) -> GatewayResult<()> {
    client.call(&format!("orders/{}", id), Method::Delete).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_with;
    use crate::gateway::RawResponse;

    #[tokio::test]
    async fn test_invalid_product_code_message() {
        let (client, _) = client_with(vec![Ok(RawResponse::new(
            400,
            r#"{"error":"Invalid productCode"}"#,
        ))]);
        let form = OrderForm {
            customer_email: "buyer@acme.com".into(),
            created_by_username: "rep@engagex.io".into(),
            items: vec![OrderItem::new("NOPE-1", 2)],
        };

        let err = create(&client, &form).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid productCode");
    }

    #[tokio::test]
    async fn test_items_serialize_without_optional_fields() {
        let (client, scripted) = client_with(vec![Ok(RawResponse::new(201, ""))]);
        let form = OrderForm {
            customer_email: "buyer@acme.com".into(),
            created_by_username: "rep@engagex.io".into(),
            items: vec![OrderItem::new("WID-1", 3)],
        };
        create(&client, &form).await.unwrap();

        let body = scripted.calls()[0].body.clone().unwrap();
        assert_eq!(
            body["items"],
            serde_json::json!([{"productCode": "WID-1", "quantity": 3}])
        );
    }

    #[tokio::test]
    async fn test_no_orders_is_empty_list() {
        let (client, _) = client_with(vec![Ok(RawResponse::new(204, ""))]);
        assert!(for_customer(&client, 1).await.unwrap().is_empty());
    }
}
