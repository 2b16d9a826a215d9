use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, encode, require_id, to_u32, Resource, Result};
use crate::api::common::Location;
use crate::api::gateway::Gateway;
use crate::client::{Chirpstack, NewGateway};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

const TYPE_NAME: &str = "chirpstack_gateway";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct GatewayModel {
    id: Option<String>,
    gateway_id: String,
    tenant_id: String,
    name: Option<String>,
    description: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<f64>,
    stats_interval: Option<i64>,
}

impl GatewayModel {
    fn location(&self) -> Location {
        Location {
            latitude: self.latitude.unwrap_or_default(),
            longitude: self.longitude.unwrap_or_default(),
            altitude: self.altitude.unwrap_or_default(),
            accuracy: 0.0,
        }
    }

    fn new_gateway(&self) -> Result<NewGateway> {
        Ok(NewGateway {
            gateway_id: self.gateway_id.clone(),
            tenant_id: self.tenant_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            location: self.location(),
            stats_interval: to_u32(self.stats_interval, "stats_interval")?,
        })
    }
}

impl From<Gateway> for GatewayModel {
    fn from(gateway: Gateway) -> Self {
        let location = gateway.location.unwrap_or_default();
        Self {
            id: Some(gateway.gateway_id.clone()),
            gateway_id: gateway.gateway_id,
            tenant_id: gateway.tenant_id,
            name: Some(gateway.name),
            description: Some(gateway.description),
            latitude: Some(location.latitude),
            longitude: Some(location.longitude),
            altitude: Some(location.altitude),
            stats_interval: Some(gateway.stats_interval.into()),
        }
    }
}

fn coordinate(description: &str) -> Attribute {
    Attribute::new(AttributeType::Float64, AttributeFlags::optional_computed())
        .with_description(description)
}

/// `chirpstack_gateway`
///
/// Create overwrites a gateway that already exists with the same id.
pub struct GatewayResource;

#[async_trait]
impl Resource for GatewayResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Gateway resource")
            .with_id("Gateway identifier, equal to the gateway EUI")
            .with_attribute(
                "gateway_id",
                Attribute::required_string()
                    .with_description("Gateway EUI (hex)")
                    .with_force_new(),
            )
            .with_attribute(
                "tenant_id",
                Attribute::required_string()
                    .with_description("Tenant ID")
                    .with_force_new(),
            )
            .with_attribute(
                "name",
                Attribute::optional_computed_string()
                    .with_description("Gateway name. Defaults to eui-<gateway_id>."),
            )
            .with_attribute(
                "description",
                Attribute::optional_computed_string()
                    .with_description("Gateway description. Defaults to eui-<gateway_id>."),
            )
            .with_attribute("latitude", coordinate("Latitude in degrees"))
            .with_attribute("longitude", coordinate("Longitude in degrees"))
            .with_attribute("altitude", coordinate("Altitude in meters"))
            .with_attribute(
                "stats_interval",
                Attribute::optional_computed_int64()
                    .with_description("Expected statistics interval in seconds"),
            )
    }

    async fn create(&self, client: &dyn Chirpstack, planned_state: Value) -> Result<Value> {
        let model: GatewayModel = decode(planned_state)?;
        let gateway = model.new_gateway()?;
        client.create_gateway(gateway.clone()).await?;
        encode(&GatewayModel::from(gateway.record()))
    }

    async fn read(&self, client: &dyn Chirpstack, current_state: Value) -> Result<Value> {
        let model: GatewayModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        let gateway = client.get_gateway(&id).await?;
        encode(&GatewayModel::from(gateway))
    }

    async fn update(
        &self,
        client: &dyn Chirpstack,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value> {
        let prior: GatewayModel = decode(prior_state)?;
        let mut model: GatewayModel = decode(planned_state)?;
        model.gateway_id = require_id(&prior.id, TYPE_NAME)?;
        let record = model.new_gateway()?.record();
        client.update_gateway(record.clone()).await?;
        encode(&GatewayModel::from(record))
    }

    async fn delete(&self, client: &dyn Chirpstack, current_state: Value) -> Result<()> {
        let model: GatewayModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        client.delete_gateway(&id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChirpstack;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_defaults_names() {
        let fake = FakeChirpstack::new();
        let created = GatewayResource
            .create(
                &fake,
                json!({"gateway_id": "0016c001ff10a235", "tenant_id": "t", "latitude": 52.5}),
            )
            .await
            .unwrap();
        assert_eq!(created["id"], "0016c001ff10a235");
        assert_eq!(created["name"], "eui-0016c001ff10a235");
        assert_eq!(created["latitude"], 52.5);

        let read = GatewayResource.read(&fake, created.clone()).await.unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_create_adopts_existing_gateway() {
        let fake = FakeChirpstack::new();
        let proposal = json!({"gateway_id": "0016c001ff10a235", "tenant_id": "t"});
        GatewayResource.create(&fake, proposal.clone()).await.unwrap();

        let mut renamed = proposal;
        renamed["name"] = json!("roof");
        let created = GatewayResource.create(&fake, renamed).await.unwrap();
        assert_eq!(created["name"], "roof");
        assert_eq!(fake.state().gateways["0016c001ff10a235"].name, "roof");
    }

    #[tokio::test]
    async fn test_update_moves_location() {
        let fake = FakeChirpstack::new();
        let created = GatewayResource
            .create(&fake, json!({"gateway_id": "gw", "tenant_id": "t"}))
            .await
            .unwrap();

        let plan = GatewayResource.plan(
            Some(&created),
            json!({"gateway_id": "gw", "tenant_id": "t", "longitude": 4.9}),
        );
        assert_eq!(plan.changes.len(), 1);
        let updated = GatewayResource
            .update(&fake, created, plan.planned_state)
            .await
            .unwrap();
        assert_eq!(updated["longitude"], 4.9);
        let stored = fake.state().gateways["gw"].clone();
        assert_eq!(stored.location.unwrap().longitude, 4.9);
    }
}
