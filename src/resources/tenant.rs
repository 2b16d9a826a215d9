use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, encode, non_empty, require_id, Resource, Result};
use crate::api::tenant::Tenant;
use crate::client::Chirpstack;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "chirpstack_tenant";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct TenantModel {
    id: Option<String>,
    name: String,
    description: Option<String>,
}

impl From<Tenant> for TenantModel {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: Some(tenant.id),
            name: tenant.name,
            description: non_empty(tenant.description),
        }
    }
}

/// `chirpstack_tenant`
pub struct TenantResource;

#[async_trait]
impl Resource for TenantResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Tenant resource")
            .with_id("Tenant identifier")
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Tenant name"),
            )
            .with_attribute(
                "description",
                Attribute::optional_string().with_description("Tenant description"),
            )
    }

    async fn create(&self, client: &dyn Chirpstack, planned_state: Value) -> Result<Value> {
        let mut model: TenantModel = decode(planned_state)?;
        let description = model.description.clone().unwrap_or_default();
        model.id = Some(client.create_tenant(&model.name, &description).await?);
        encode(&model)
    }

    async fn read(&self, client: &dyn Chirpstack, current_state: Value) -> Result<Value> {
        let model: TenantModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        let tenant = client.get_tenant(&id).await?;
        encode(&TenantModel::from(tenant))
    }

    async fn update(
        &self,
        client: &dyn Chirpstack,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value> {
        let prior: TenantModel = decode(prior_state)?;
        let mut model: TenantModel = decode(planned_state)?;
        let id = require_id(&prior.id, TYPE_NAME)?;
        client
            .update_tenant(Tenant {
                id: id.clone(),
                name: model.name.clone(),
                description: model.description.clone().unwrap_or_default(),
            })
            .await?;
        model.id = Some(id);
        encode(&model)
    }

    async fn delete(&self, client: &dyn Chirpstack, current_state: Value) -> Result<()> {
        let model: TenantModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        client.delete_tenant(&id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChirpstack;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_read() {
        let fake = FakeChirpstack::new();
        let created = TenantResource
            .create(&fake, json!({"name": "acme", "description": "d"}))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(fake.state().tenants[&id].description, "d");

        let read = TenantResource.read(&fake, created.clone()).await.unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_empty_description_reads_as_null() {
        let fake = FakeChirpstack::new();
        let created = TenantResource
            .create(&fake, json!({"name": "acme"}))
            .await
            .unwrap();
        let read = TenantResource.read(&fake, created).await.unwrap();
        assert!(read["description"].is_null());
    }

    #[tokio::test]
    async fn test_deleted_tenant_reports_not_found() {
        let fake = FakeChirpstack::new();
        let created = TenantResource
            .create(&fake, json!({"name": "acme"}))
            .await
            .unwrap();
        TenantResource.delete(&fake, created.clone()).await.unwrap();

        let err = TenantResource.read(&fake, created.clone()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("failed to get tenant"));

        let err = TenantResource.delete(&fake, created).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("failed to delete tenant"));
    }

    #[tokio::test]
    async fn test_update_keeps_prior_id() {
        let fake = FakeChirpstack::new();
        let created = TenantResource
            .create(&fake, json!({"name": "acme"}))
            .await
            .unwrap();
        let updated = TenantResource
            .update(&fake, created.clone(), json!({"name": "acme-2"}))
            .await
            .unwrap();
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["name"], "acme-2");
    }

    #[tokio::test]
    async fn test_read_without_id_fails() {
        let fake = FakeChirpstack::new();
        let err = TenantResource
            .read(&fake, json!({"name": "acme"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("has no id"));
    }
}
