use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, encode, non_empty, require_id, Resource, Result};
use crate::api::application::Application;
use crate::client::Chirpstack;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "chirpstack_application";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ApplicationModel {
    id: Option<String>,
    tenant_id: String,
    name: String,
    description: Option<String>,
}

impl ApplicationModel {
    fn record(&self, id: String) -> Application {
        Application {
            id,
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            tenant_id: self.tenant_id.clone(),
        }
    }
}

impl From<Application> for ApplicationModel {
    fn from(app: Application) -> Self {
        Self {
            id: Some(app.id),
            tenant_id: app.tenant_id,
            name: app.name,
            description: non_empty(app.description),
        }
    }
}

/// `chirpstack_application`
pub struct ApplicationResource;

#[async_trait]
impl Resource for ApplicationResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Application resource")
            .with_id("Application identifier")
            .with_attribute(
                "tenant_id",
                Attribute::required_string()
                    .with_description("Tenant ID")
                    .with_force_new(),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Application name"),
            )
            .with_attribute(
                "description",
                Attribute::optional_string().with_description("Application description"),
            )
    }

    async fn create(&self, client: &dyn Chirpstack, planned_state: Value) -> Result<Value> {
        let mut model: ApplicationModel = decode(planned_state)?;
        let description = model.description.clone().unwrap_or_default();
        let id = client
            .create_application(&model.tenant_id, &model.name, &description)
            .await?;
        model.id = Some(id);
        encode(&model)
    }

    async fn read(&self, client: &dyn Chirpstack, current_state: Value) -> Result<Value> {
        let model: ApplicationModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        let app = client.get_application(&id).await?;
        encode(&ApplicationModel::from(app))
    }

    async fn update(
        &self,
        client: &dyn Chirpstack,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value> {
        let prior: ApplicationModel = decode(prior_state)?;
        let mut model: ApplicationModel = decode(planned_state)?;
        let id = require_id(&prior.id, TYPE_NAME)?;
        client.update_application(model.record(id.clone())).await?;
        model.id = Some(id);
        encode(&model)
    }

    async fn delete(&self, client: &dyn Chirpstack, current_state: Value) -> Result<()> {
        let model: ApplicationModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        client.delete_application(&id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChirpstack;
    use serde_json::json;

    #[tokio::test]
    async fn test_lifecycle() {
        let fake = FakeChirpstack::new();
        let created = ApplicationResource
            .create(&fake, json!({"tenant_id": "t", "name": "meters"}))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(fake.state().applications[&id].tenant_id, "t");

        let updated = ApplicationResource
            .update(
                &fake,
                created,
                json!({"tenant_id": "t", "name": "meters", "description": "water"}),
            )
            .await
            .unwrap();
        let read = ApplicationResource.read(&fake, updated).await.unwrap();
        assert_eq!(read["description"], "water");
        assert_eq!(read["id"], id.as_str());

        ApplicationResource.delete(&fake, read).await.unwrap();
        assert!(fake.state().applications.is_empty());
    }

    #[test]
    fn test_moving_tenants_replaces() {
        let prior = json!({"id": "a", "tenant_id": "t", "name": "meters", "description": null});
        let plan = ApplicationResource.plan(
            Some(&prior),
            json!({"tenant_id": "u", "name": "meters"}),
        );
        assert!(plan.requires_replace);
        assert_eq!(plan.planned_state["id"], "a");
    }
}
