use serde::{Deserialize, Serialize};

use crate::gateway::{ApiClient, GatewayResult, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionType {
    Call,
    Email,
    Meeting,
    Note,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionForm {
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub details: String,
    pub created_by_name: String,
    pub active: bool,
}

pub async fn for_customer(client: &ApiClient, customer_id: u64) -> GatewayResult<Vec<Interaction>> {
    client
        .get::<Option<Vec<Interaction>>>(&format!("interactions/customer/{}", customer_id))
        .await
        .map(Option::unwrap_or_default)
}

pub async fn get(client: &ApiClient, id: u64) -> GatewayResult<Interaction> {
    client.get(&format!("interactions/{}", id)).await
}

pub async fn update(
    client: &ApiClient,
    id: u64,
    form: &InteractionForm,
) -> GatewayResult<Option<Interaction>> {
    client
        .send_json(&format!("interactions/{}", id), Method::Put, form)
        .await
}

pub async fn soft_delete(client: &ApiClient, id: u64) -> GatewayResult<()> {
    client
        .call(&format!("interactions/soft-delete/{}", id), Method::Patch)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{client_with, ok};

    #[tokio::test]
    async fn test_type_field_renamed() {
        let (client, scripted) = client_with(vec![
            ok(r#"[{"id":4,"type":"MEETING","details":"Kickoff","createdByName":"Bob"}]"#),
            ok(""),
        ]);

        let list = for_customer(&client, 2).await.unwrap();
        assert_eq!(list[0].kind, InteractionType::Meeting);
        assert!(list[0].active);

        let form = InteractionForm {
            kind: InteractionType::Call,
            details: "Follow-up".into(),
            created_by_name: "Bob".into(),
            active: true,
        };
        update(&client, 4, &form).await.unwrap();
        let body = scripted.calls()[1].body.clone().unwrap();
        assert_eq!(body["type"], "CALL");
        assert_eq!(body["createdByName"], "Bob");
    }
}
