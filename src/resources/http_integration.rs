//! HTTP event forwarding for an application. There is at most one per
//! application, so the application id doubles as the resource id.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, encode, require_id, Resource, Result};
use crate::api::application::{Encoding, HttpIntegration};
use crate::client::Chirpstack;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

const TYPE_NAME: &str = "chirpstack_http_integration";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct HttpIntegrationModel {
    id: Option<String>,
    application_id: String,
    encoding: String,
    event_endpoint_url: String,
    headers: Option<HashMap<String, String>>,
}

impl HttpIntegrationModel {
    fn record(&self) -> HttpIntegration {
        HttpIntegration {
            application_id: self.application_id.clone(),
            headers: self.headers.clone().unwrap_or_default(),
            encoding: Encoding::from_str_name(&self.encoding).unwrap_or_default() as i32,
            event_endpoint_url: self.event_endpoint_url.clone(),
        }
    }
}

impl From<HttpIntegration> for HttpIntegrationModel {
    fn from(integration: HttpIntegration) -> Self {
        let encoding = integration.encoding().as_str_name().to_string();
        Self {
            id: Some(integration.application_id.clone()),
            application_id: integration.application_id,
            encoding,
            event_endpoint_url: integration.event_endpoint_url,
            headers: Some(integration.headers).filter(|h| !h.is_empty()),
        }
    }
}

/// `chirpstack_http_integration`
pub struct HttpIntegrationResource;

#[async_trait]
impl Resource for HttpIntegrationResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("HTTP integration resource")
            .with_id("HTTP integration identifier, equal to the application ID")
            .with_attribute(
                "application_id",
                Attribute::required_string()
                    .with_description("Application ID")
                    .with_force_new(),
            )
            .with_attribute(
                "encoding",
                Attribute::required_string().with_description("Payload encoding. JSON or PROTOBUF."),
            )
            .with_attribute(
                "event_endpoint_url",
                Attribute::required_string().with_description("Endpoint events are posted to"),
            )
            .with_attribute(
                "headers",
                Attribute::new(
                    AttributeType::map(AttributeType::String),
                    AttributeFlags::optional(),
                )
                .with_description("Headers sent with every request"),
            )
    }

    async fn create(&self, client: &dyn Chirpstack, planned_state: Value) -> Result<Value> {
        let mut model: HttpIntegrationModel = decode(planned_state)?;
        client.create_http_integration(model.record()).await?;
        model.id = Some(model.application_id.clone());
        encode(&model)
    }

    async fn read(&self, client: &dyn Chirpstack, current_state: Value) -> Result<Value> {
        let model: HttpIntegrationModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        let integration = client.get_http_integration(&id).await?;
        encode(&HttpIntegrationModel::from(integration))
    }

    async fn update(
        &self,
        client: &dyn Chirpstack,
        _prior_state: Value,
        planned_state: Value,
    ) -> Result<Value> {
        let mut model: HttpIntegrationModel = decode(planned_state)?;
        client.update_http_integration(model.record()).await?;
        model.id = Some(model.application_id.clone());
        encode(&model)
    }

    async fn delete(&self, client: &dyn Chirpstack, current_state: Value) -> Result<()> {
        let model: HttpIntegrationModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        client.delete_http_integration(&id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Chirpstack;
    use crate::testing::FakeChirpstack;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_read_back() {
        let fake = FakeChirpstack::new();
        let app = fake.create_application("t", "meters", "").await.unwrap();

        let created = HttpIntegrationResource
            .create(
                &fake,
                json!({
                    "application_id": app,
                    "encoding": "PROTOBUF",
                    "event_endpoint_url": "https://hooks.example.com/up",
                    "headers": {"X-Token": "abc"}
                }),
            )
            .await
            .unwrap();
        assert_eq!(created["id"], app.as_str());
        assert_eq!(
            fake.state().http_integrations[&app].encoding,
            Encoding::Protobuf as i32
        );

        let read = HttpIntegrationResource.read(&fake, created.clone()).await.unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_no_headers_reads_as_null() {
        let fake = FakeChirpstack::new();
        let app = fake.create_application("t", "meters", "").await.unwrap();
        let created = HttpIntegrationResource
            .create(
                &fake,
                json!({"application_id": app, "encoding": "JSON", "event_endpoint_url": "u"}),
            )
            .await
            .unwrap();
        let read = HttpIntegrationResource.read(&fake, created).await.unwrap();
        assert!(read["headers"].is_null());
        assert_eq!(read["encoding"], "JSON");
    }

    #[test]
    fn test_unknown_encoding_falls_back_to_json() {
        let model = HttpIntegrationModel {
            encoding: "XML".to_string(),
            ..Default::default()
        };
        assert_eq!(model.record().encoding, Encoding::Json as i32);
    }
}
