use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, encode, non_empty, require_id, to_u32, Resource, Result};
use crate::api::common::{MacVersion, RegParamsRevision, Region};
use crate::api::device_profile::DeviceProfile;
use crate::client::Chirpstack;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "chirpstack_device_profile";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DeviceProfileModel {
    id: Option<String>,
    tenant_id: String,
    name: String,
    description: Option<String>,
    region: String,
    region_config_id: Option<String>,
    region_parameters_revision: String,
    mac_version: String,
    adr_algorithm: Option<String>,
    flush_queue_on_activate: Option<bool>,
    allow_roaming: Option<bool>,
    expected_uplink_interval: Option<i64>,
    device_status_request_frequency: Option<i64>,
    device_supports_otaa: Option<bool>,
    device_supports_class_b: Option<bool>,
    device_supports_class_c: Option<bool>,
    class_c_timeout: Option<i64>,
}

impl DeviceProfileModel {
    /// Unknown enum names map to the zero variant; the server judges them.
    fn record(&self, id: String) -> Result<DeviceProfile> {
        Ok(DeviceProfile {
            id,
            tenant_id: self.tenant_id.clone(),
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            region: Region::from_str_name(&self.region).unwrap_or_default() as i32,
            region_config_id: self.region_config_id.clone().unwrap_or_default(),
            reg_params_revision: RegParamsRevision::from_str_name(&self.region_parameters_revision)
                .unwrap_or_default() as i32,
            mac_version: MacVersion::from_str_name(&self.mac_version).unwrap_or_default() as i32,
            adr_algorithm_id: self.adr_algorithm.clone().unwrap_or_default(),
            flush_queue_on_activate: self.flush_queue_on_activate.unwrap_or_default(),
            allow_roaming: self.allow_roaming.unwrap_or_default(),
            uplink_interval: to_u32(self.expected_uplink_interval, "expected_uplink_interval")?,
            device_status_req_interval: to_u32(
                self.device_status_request_frequency,
                "device_status_request_frequency",
            )?,
            supports_otaa: self.device_supports_otaa.unwrap_or_default(),
            supports_class_b: self.device_supports_class_b.unwrap_or_default(),
            supports_class_c: self.device_supports_class_c.unwrap_or_default(),
            class_c_timeout: to_u32(self.class_c_timeout, "class_c_timeout")?,
        })
    }
}

impl From<DeviceProfile> for DeviceProfileModel {
    fn from(profile: DeviceProfile) -> Self {
        Self {
            region: profile.region().as_str_name().to_string(),
            region_parameters_revision: profile.reg_params_revision().as_str_name().to_string(),
            mac_version: profile.mac_version().as_str_name().to_string(),
            id: Some(profile.id),
            tenant_id: profile.tenant_id,
            name: profile.name,
            description: non_empty(profile.description),
            region_config_id: non_empty(profile.region_config_id),
            adr_algorithm: non_empty(profile.adr_algorithm_id),
            flush_queue_on_activate: Some(profile.flush_queue_on_activate),
            allow_roaming: Some(profile.allow_roaming),
            expected_uplink_interval: Some(profile.uplink_interval.into()),
            device_status_request_frequency: Some(profile.device_status_req_interval.into()),
            device_supports_otaa: Some(profile.supports_otaa),
            device_supports_class_b: Some(profile.supports_class_b),
            device_supports_class_c: Some(profile.supports_class_c),
            class_c_timeout: Some(profile.class_c_timeout.into()),
        }
    }
}

/// `chirpstack_device_profile`
pub struct DeviceProfileResource;

#[async_trait]
impl Resource for DeviceProfileResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Device profile resource")
            .with_id("Device profile identifier")
            .with_attribute(
                "tenant_id",
                Attribute::required_string()
                    .with_description("Tenant ID")
                    .with_force_new(),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Device profile name"),
            )
            .with_attribute(
                "description",
                Attribute::optional_string().with_description("Device profile description"),
            )
            .with_attribute(
                "region",
                Attribute::required_string().with_description("Region, e.g. EU868"),
            )
            .with_attribute(
                "region_config_id",
                Attribute::optional_string().with_description("Region configuration ID"),
            )
            .with_attribute(
                "mac_version",
                Attribute::required_string()
                    .with_description("LoRaWAN MAC version supported by the device"),
            )
            .with_attribute(
                "region_parameters_revision",
                Attribute::required_string()
                    .with_description("Regional Parameters revision supported by the device"),
            )
            .with_attribute(
                "adr_algorithm",
                Attribute::optional_string()
                    .with_description("ADR algorithm controlling the device data-rate"),
            )
            .with_attribute(
                "flush_queue_on_activate",
                Attribute::optional_computed_bool()
                    .with_description("Flush the downlink queue when the device activates"),
            )
            .with_attribute(
                "allow_roaming",
                Attribute::optional_computed_bool()
                    .with_description("Allow the device to use roaming when configured"),
            )
            .with_attribute(
                "expected_uplink_interval",
                Attribute::optional_computed_int64()
                    .with_description("Expected uplink interval in seconds"),
            )
            .with_attribute(
                "device_status_request_frequency",
                Attribute::optional_computed_int64()
                    .with_description("Device status requests per day. 0 disables them."),
            )
            .with_attribute(
                "device_supports_otaa",
                Attribute::optional_computed_bool().with_description("Device supports OTAA"),
            )
            .with_attribute(
                "device_supports_class_b",
                Attribute::optional_computed_bool().with_description("Device supports Class-B"),
            )
            .with_attribute(
                "device_supports_class_c",
                Attribute::optional_computed_bool().with_description("Device supports Class-C"),
            )
            .with_attribute(
                "class_c_timeout",
                Attribute::optional_computed_int64()
                    .with_description("Class-C confirmation timeout in seconds"),
            )
    }

    async fn create(&self, client: &dyn Chirpstack, planned_state: Value) -> Result<Value> {
        let model: DeviceProfileModel = decode(planned_state)?;
        let mut record = model.record(String::new())?;
        record.id = client.create_device_profile(record.clone()).await?;
        encode(&DeviceProfileModel::from(record))
    }

    async fn read(&self, client: &dyn Chirpstack, current_state: Value) -> Result<Value> {
        let model: DeviceProfileModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        let profile = client.get_device_profile(&id).await?;
        encode(&DeviceProfileModel::from(profile))
    }

    async fn update(
        &self,
        client: &dyn Chirpstack,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value> {
        let prior: DeviceProfileModel = decode(prior_state)?;
        let model: DeviceProfileModel = decode(planned_state)?;
        let record = model.record(require_id(&prior.id, TYPE_NAME)?)?;
        client.update_device_profile(record.clone()).await?;
        encode(&DeviceProfileModel::from(record))
    }

    async fn delete(&self, client: &dyn Chirpstack, current_state: Value) -> Result<()> {
        let model: DeviceProfileModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        client.delete_device_profile(&id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChirpstack;
    use serde_json::json;

    fn proposal(name: &str) -> Value {
        json!({
            "tenant_id": "t",
            "name": name,
            "description": "test",
            "region": "AU915",
            "region_parameters_revision": "A",
            "mac_version": "LORAWAN_1_0_3",
            "flush_queue_on_activate": true,
            "allow_roaming": false,
            "expected_uplink_interval": 3600,
            "device_status_request_frequency": 1,
            "device_supports_otaa": true,
            "device_supports_class_b": false,
            "device_supports_class_c": false
        })
    }

    #[tokio::test]
    async fn test_create_maps_upstream_enum_names() {
        let fake = FakeChirpstack::new();
        let created = DeviceProfileResource
            .create(&fake, proposal("one"))
            .await
            .unwrap();

        let id = created["id"].as_str().unwrap().to_string();
        let stored = fake.state().device_profiles[&id].clone();
        assert_eq!(stored.region(), Region::Au915);
        assert_eq!(stored.mac_version(), MacVersion::Lorawan103);
        assert_eq!(stored.uplink_interval, 3600);
        assert!(stored.supports_otaa);

        assert_eq!(created["class_c_timeout"], 0);
        assert!(created["adr_algorithm"].is_null());
    }

    #[tokio::test]
    async fn test_read_after_create_is_stable() {
        let fake = FakeChirpstack::new();
        let created = DeviceProfileResource
            .create(&fake, proposal("one"))
            .await
            .unwrap();
        let read = DeviceProfileResource.read(&fake, created.clone()).await.unwrap();
        assert_eq!(read, created);

        let plan = DeviceProfileResource.plan(Some(&read), proposal("one"));
        assert!(!plan.has_changes(), "{:?}", plan.changes);
    }

    #[tokio::test]
    async fn test_rename_updates_in_place() {
        let fake = FakeChirpstack::new();
        let created = DeviceProfileResource
            .create(&fake, proposal("one"))
            .await
            .unwrap();

        let plan = DeviceProfileResource.plan(Some(&created), proposal("two"));
        assert!(!plan.requires_replace);
        let updated = DeviceProfileResource
            .update(&fake, created.clone(), plan.planned_state)
            .await
            .unwrap();
        assert_eq!(updated["name"], "two");
        assert_eq!(updated["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_negative_interval_is_rejected() {
        let fake = FakeChirpstack::new();
        let mut bad = proposal("one");
        bad["expected_uplink_interval"] = json!(-5);
        let err = DeviceProfileResource.create(&fake, bad).await.unwrap_err();
        assert!(err.to_string().contains("expected_uplink_interval"));
        assert!(fake.state().device_profiles.is_empty());
    }

    #[test]
    fn test_unknown_region_maps_to_zero() {
        let model = DeviceProfileModel {
            region: "MARS".to_string(),
            ..Default::default()
        };
        assert_eq!(model.record(String::new()).unwrap().region, 0);
    }
}
