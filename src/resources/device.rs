//! ABP-activated LoRaWAN 1.0.x devices.
//!
//! Creating a device registers the record, installs its root key and
//! activates its session. A failure part-way leaves the earlier steps on the
//! server; the error names the step that failed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, encode, non_empty, require_id, Resource, Result};
use crate::api::device::Device;
use crate::client::{Chirpstack, DeviceView, NewDevice};
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "chirpstack_device";
const DEFAULT_JOIN_EUI: &str = "0000000000000000";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DeviceModel {
    id: Option<String>,
    dev_eui: String,
    application_id: String,
    device_profile_id: String,
    name: String,
    description: Option<String>,
    join_eui: Option<String>,
    dev_addr: String,
    app_s_key: String,
    nwk_s_enc_key: String,
    app_key: String,
    class_enabled: Option<String>,
}

impl DeviceModel {
    fn new_device(&self) -> NewDevice {
        NewDevice {
            application_id: self.application_id.clone(),
            device_profile_id: self.device_profile_id.clone(),
            dev_eui: self.dev_eui.clone(),
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            join_eui: self.join_eui().to_string(),
            dev_addr: self.dev_addr.clone(),
            app_s_key: self.app_s_key.clone(),
            nwk_s_enc_key: self.nwk_s_enc_key.clone(),
            app_key: self.app_key.clone(),
        }
    }

    fn join_eui(&self) -> &str {
        self.join_eui
            .as_deref()
            .filter(|eui| !eui.is_empty())
            .unwrap_or(DEFAULT_JOIN_EUI)
    }
}

impl From<DeviceView> for DeviceModel {
    fn from(view: DeviceView) -> Self {
        Self {
            id: Some(view.device.dev_eui.clone()),
            dev_eui: view.device.dev_eui,
            application_id: view.device.application_id,
            device_profile_id: view.device.device_profile_id,
            name: view.device.name,
            description: non_empty(view.device.description),
            join_eui: non_empty(view.device.join_eui),
            dev_addr: view.activation.dev_addr,
            app_s_key: view.activation.app_s_key,
            nwk_s_enc_key: view.activation.nwk_s_enc_key,
            app_key: view.keys.nwk_key,
            class_enabled: Some(view.class_enabled.as_str_name().to_string()),
        }
    }
}

/// `chirpstack_device`
pub struct DeviceResource;

#[async_trait]
impl Resource for DeviceResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let key = |description: &str| {
            Attribute::required_string()
                .with_description(description)
                .with_force_new()
                .sensitive()
        };
        Schema::v0()
            .with_description("Device resource, activated by personalization")
            .with_id("Device identifier, equal to the DevEUI")
            .with_attribute(
                "dev_eui",
                Attribute::required_string()
                    .with_description("DevEUI (hex)")
                    .with_force_new(),
            )
            .with_attribute(
                "application_id",
                Attribute::required_string()
                    .with_description("Application ID")
                    .with_force_new(),
            )
            .with_attribute(
                "device_profile_id",
                Attribute::required_string().with_description("Device profile ID"),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Device name"),
            )
            .with_attribute(
                "description",
                Attribute::optional_string().with_description("Device description"),
            )
            .with_attribute(
                "join_eui",
                Attribute::optional_computed_string()
                    .with_description("JoinEUI (hex)")
                    .with_default(Value::String(DEFAULT_JOIN_EUI.to_string())),
            )
            .with_attribute(
                "dev_addr",
                Attribute::required_string()
                    .with_description("Device address (hex)")
                    .with_force_new(),
            )
            .with_attribute("app_s_key", key("Application session key (hex)"))
            .with_attribute("nwk_s_enc_key", key("Network session encryption key (hex)"))
            .with_attribute("app_key", key("Root application key (hex)"))
            .with_attribute(
                "class_enabled",
                Attribute::computed_string().with_description("Device class currently enabled"),
            )
    }

    async fn create(&self, client: &dyn Chirpstack, planned_state: Value) -> Result<Value> {
        let model: DeviceModel = decode(planned_state)?;
        client.create_device(model.new_device()).await?;
        let view = client.get_device(&model.dev_eui).await?;
        encode(&DeviceModel::from(view))
    }

    async fn read(&self, client: &dyn Chirpstack, current_state: Value) -> Result<Value> {
        let model: DeviceModel = decode(current_state)?;
        let dev_eui = require_id(&model.id, TYPE_NAME)?;
        let view = client.get_device(&dev_eui).await?;
        encode(&DeviceModel::from(view))
    }

    async fn update(
        &self,
        client: &dyn Chirpstack,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value> {
        let prior: DeviceModel = decode(prior_state)?;
        let mut model: DeviceModel = decode(planned_state)?;
        let dev_eui = require_id(&prior.id, TYPE_NAME)?;
        client
            .update_device(Device {
                dev_eui: dev_eui.clone(),
                name: model.name.clone(),
                description: model.description.clone().unwrap_or_default(),
                application_id: model.application_id.clone(),
                device_profile_id: model.device_profile_id.clone(),
                join_eui: model.join_eui().to_string(),
            })
            .await?;
        model.id = Some(dev_eui);
        model.class_enabled = prior.class_enabled;
        encode(&model)
    }

    async fn delete(&self, client: &dyn Chirpstack, current_state: Value) -> Result<()> {
        let model: DeviceModel = decode(current_state)?;
        let dev_eui = require_id(&model.id, TYPE_NAME)?;
        client.delete_device(&dev_eui).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChirpstack;
    use serde_json::json;
    use tonic::Code;

    fn proposal() -> Value {
        json!({
            "dev_eui": "0102030405060708",
            "application_id": "app",
            "device_profile_id": "dp",
            "name": "sensor",
            "dev_addr": "01020304",
            "app_s_key": "aa".repeat(16),
            "nwk_s_enc_key": "bb".repeat(16),
            "app_key": "cc".repeat(16)
        })
    }

    #[tokio::test]
    async fn test_create_reads_back_keys_and_session() {
        let fake = FakeChirpstack::new();
        let created = DeviceResource.create(&fake, proposal()).await.unwrap();

        assert_eq!(created["id"], "0102030405060708");
        assert_eq!(created["app_key"], "cc".repeat(16));
        assert_eq!(created["dev_addr"], "01020304");
        assert_eq!(created["class_enabled"], "CLASS_A");
        assert_eq!(created["join_eui"], DEFAULT_JOIN_EUI);
    }

    #[tokio::test]
    async fn test_failed_activation_reports_step() {
        let fake = FakeChirpstack::new();
        fake.fail_on("activate device", Code::InvalidArgument);

        let err = DeviceResource.create(&fake, proposal()).await.unwrap_err();
        assert!(err.to_string().contains("activate device 0102030405060708"));
        assert!(fake.state().devices.contains_key("0102030405060708"));
    }

    #[tokio::test]
    async fn test_record_without_keys_is_an_error() {
        let fake = FakeChirpstack::new();
        fake.create_device_record(Device {
            dev_eui: "0102030405060708".to_string(),
            application_id: "app".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let err = DeviceResource
            .read(&fake, json!({"id": "0102030405060708"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("get keys for device 0102030405060708"));
    }

    #[tokio::test]
    async fn test_import_by_dev_eui() {
        let fake = FakeChirpstack::new();
        let created = DeviceResource.create(&fake, proposal()).await.unwrap();
        let imported = DeviceResource
            .import(&fake, "0102030405060708")
            .await
            .unwrap();
        assert_eq!(imported, created);
    }

    #[tokio::test]
    async fn test_rename_keeps_session() {
        let fake = FakeChirpstack::new();
        let created = DeviceResource.create(&fake, proposal()).await.unwrap();

        let mut renamed = proposal();
        renamed["name"] = json!("sensor-2");
        let plan = DeviceResource.plan(Some(&created), renamed);
        assert!(!plan.requires_replace);

        let updated = DeviceResource
            .update(&fake, created, plan.planned_state)
            .await
            .unwrap();
        let read = DeviceResource.read(&fake, updated).await.unwrap();
        assert_eq!(read["name"], "sensor-2");
        assert_eq!(read["nwk_s_enc_key"], "bb".repeat(16));
    }

    #[test]
    fn test_new_key_replaces_device() {
        let prior = json!({
            "id": "0102030405060708",
            "dev_eui": "0102030405060708",
            "app_key": "cc".repeat(16)
        });
        let mut proposed = prior.clone();
        proposed["app_key"] = json!("dd".repeat(16));
        assert!(DeviceResource.plan(Some(&prior), proposed).requires_replace);
    }

    #[test]
    fn test_keys_are_sensitive() {
        let schema = DeviceResource.schema();
        for key in ["app_s_key", "nwk_s_enc_key", "app_key"] {
            assert!(schema.attributes[key].flags.sensitive, "{}", key);
        }
    }
}
