//! Class-C multicast groups and their gateway membership.
//!
//! ChirpStack has no call to change a group in place, so every group
//! attribute forces replacement. Only `gateway_ids` updates in place, by
//! adding and removing gateways. Membership cannot be read back and is kept
//! as last written, in the configured order. Plan compares it as a set.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode, encode, plan_from_schema, require_id, to_u32, Resource, Result};
use crate::api::common::Region;
use crate::api::multicast_group::MulticastGroup;
use crate::client::{Chirpstack, NewMulticastGroup};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};
use crate::types::PlanResult;

const TYPE_NAME: &str = "chirpstack_multicast_group";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct MulticastGroupModel {
    id: Option<String>,
    application_id: String,
    name: String,
    region: String,
    mc_addr: String,
    mc_nwk_s_key: String,
    mc_app_s_key: String,
    dr: Option<i64>,
    frequency: Option<i64>,
    f_cnt: Option<i64>,
    gateway_ids: Option<Vec<String>>,
}

impl MulticastGroupModel {
    fn new_group(&self) -> Result<NewMulticastGroup> {
        Ok(NewMulticastGroup {
            application_id: self.application_id.clone(),
            name: self.name.clone(),
            region: Region::from_str_name(&self.region).unwrap_or_default(),
            mc_addr: self.mc_addr.clone(),
            mc_nwk_s_key: self.mc_nwk_s_key.clone(),
            mc_app_s_key: self.mc_app_s_key.clone(),
            f_cnt: 0,
            dr: to_u32(self.dr, "dr")?,
            frequency: to_u32(self.frequency, "frequency")?,
        })
    }

    fn gateways(&self) -> BTreeSet<String> {
        self.gateway_ids.iter().flatten().cloned().collect()
    }

    /// Remote values with membership carried over from `self`.
    fn refreshed(&self, group: MulticastGroup) -> Self {
        Self {
            region: group.region().as_str_name().to_string(),
            id: Some(group.id),
            application_id: group.application_id,
            name: group.name,
            mc_addr: group.mc_addr,
            mc_nwk_s_key: group.mc_nwk_s_key,
            mc_app_s_key: group.mc_app_s_key,
            dr: Some(group.dr.into()),
            frequency: Some(group.frequency.into()),
            f_cnt: Some(group.f_cnt.into()),
            gateway_ids: self.gateway_ids.clone(),
        }
    }
}

fn replacing(attribute: Attribute) -> Attribute {
    attribute.with_force_new()
}

fn members(value: &Value) -> Option<BTreeSet<&str>> {
    value.as_array()?.iter().map(Value::as_str).collect()
}

/// `chirpstack_multicast_group`
pub struct MulticastGroupResource;

#[async_trait]
impl Resource for MulticastGroupResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Class-C multicast group resource")
            .with_id("Multicast group identifier")
            .with_attribute(
                "application_id",
                replacing(Attribute::required_string().with_description("Application ID")),
            )
            .with_attribute(
                "name",
                replacing(Attribute::required_string().with_description("Group name")),
            )
            .with_attribute(
                "region",
                replacing(Attribute::required_string().with_description("Region, e.g. EU868")),
            )
            .with_attribute(
                "mc_addr",
                replacing(Attribute::required_string().with_description("Multicast address (hex)")),
            )
            .with_attribute(
                "mc_nwk_s_key",
                replacing(Attribute::required_string().with_description("Network session key (hex)"))
                    .sensitive(),
            )
            .with_attribute(
                "mc_app_s_key",
                replacing(
                    Attribute::required_string().with_description("Application session key (hex)"),
                )
                .sensitive(),
            )
            .with_attribute(
                "dr",
                replacing(Attribute::optional_computed_int64().with_description("Data rate")),
            )
            .with_attribute(
                "frequency",
                replacing(Attribute::required_int64().with_description("Frequency in Hz")),
            )
            .with_attribute(
                "f_cnt",
                Attribute::new(AttributeType::Int64, AttributeFlags::computed())
                    .with_description("Next downlink frame counter"),
            )
            .with_attribute(
                "gateway_ids",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::optional(),
                )
                .with_description("Gateways that transmit the group's downlinks"),
            )
    }

    /// A reordered `gateway_ids` keeps the prior value.
    fn plan(&self, prior_state: Option<&Value>, mut proposed_state: Value) -> PlanResult {
        if let Some(prior_ids) = prior_state.and_then(|p| p.get("gateway_ids")) {
            let reordered = match proposed_state.get("gateway_ids") {
                Some(proposed_ids) => {
                    members(prior_ids).is_some() && members(prior_ids) == members(proposed_ids)
                },
                None => false,
            };
            if reordered {
                proposed_state["gateway_ids"] = prior_ids.clone();
            }
        }
        plan_from_schema(&self.schema(), prior_state, proposed_state)
    }

    async fn create(&self, client: &dyn Chirpstack, planned_state: Value) -> Result<Value> {
        let model: MulticastGroupModel = decode(planned_state)?;
        let id = client.create_multicast_group(model.new_group()?).await?;
        for gateway_id in model.gateways() {
            client
                .add_gateway_to_multicast_group(&id, &gateway_id)
                .await?;
        }
        let group = client.get_multicast_group(&id).await?;
        encode(&model.refreshed(group))
    }

    async fn read(&self, client: &dyn Chirpstack, current_state: Value) -> Result<Value> {
        let model: MulticastGroupModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        let group = client.get_multicast_group(&id).await?;
        encode(&model.refreshed(group))
    }

    async fn update(
        &self,
        client: &dyn Chirpstack,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value> {
        let prior: MulticastGroupModel = decode(prior_state)?;
        let model: MulticastGroupModel = decode(planned_state)?;
        let id = require_id(&prior.id, TYPE_NAME)?;

        let (before, after) = (prior.gateways(), model.gateways());
        for gateway_id in before.difference(&after) {
            debug!(multicast_group_id = %id, gateway_id = %gateway_id, "Removing gateway");
            client
                .remove_gateway_from_multicast_group(&id, gateway_id)
                .await?;
        }
        for gateway_id in after.difference(&before) {
            debug!(multicast_group_id = %id, gateway_id = %gateway_id, "Adding gateway");
            client
                .add_gateway_to_multicast_group(&id, gateway_id)
                .await?;
        }

        let group = client.get_multicast_group(&id).await?;
        encode(&model.refreshed(group))
    }

    async fn delete(&self, client: &dyn Chirpstack, current_state: Value) -> Result<()> {
        let model: MulticastGroupModel = decode(current_state)?;
        let id = require_id(&model.id, TYPE_NAME)?;
        client.delete_multicast_group(&id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::gateway::Gateway;
    use crate::api::multicast_group::{MulticastGroupSchedulingType, MulticastGroupType};
    use crate::testing::FakeChirpstack;
    use serde_json::json;

    async fn fake_with_gateways(ids: &[&str]) -> FakeChirpstack {
        let fake = FakeChirpstack::new();
        for id in ids {
            fake.create_gateway_record(Gateway {
                gateway_id: id.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        }
        fake
    }

    fn proposal(gateways: &[&str]) -> Value {
        json!({
            "application_id": "app",
            "name": "streetlights",
            "region": "EU868",
            "mc_addr": "01020304",
            "mc_nwk_s_key": "aa".repeat(16),
            "mc_app_s_key": "bb".repeat(16),
            "dr": 5,
            "frequency": 869525000,
            "gateway_ids": gateways
        })
    }

    #[tokio::test]
    async fn test_create_is_class_c_with_members() {
        let fake = fake_with_gateways(&["gw1", "gw2"]).await;
        let created = MulticastGroupResource
            .create(&fake, proposal(&["gw1", "gw2"]))
            .await
            .unwrap();

        let id = created["id"].as_str().unwrap().to_string();
        let state = fake.state();
        let group = &state.multicast_groups[&id];
        assert_eq!(group.group_type(), MulticastGroupType::ClassC);
        assert_eq!(
            group.class_c_scheduling_type(),
            MulticastGroupSchedulingType::GpsTime
        );
        assert_eq!(group.frequency, 869525000);
        assert_eq!(state.multicast_gateways.len(), 2);
        assert_eq!(created["f_cnt"], 0);
        assert_eq!(created["gateway_ids"], json!(["gw1", "gw2"]));
    }

    #[tokio::test]
    async fn test_update_reconciles_membership() {
        let fake = fake_with_gateways(&["gw1", "gw2", "gw3"]).await;
        let created = MulticastGroupResource
            .create(&fake, proposal(&["gw1", "gw2"]))
            .await
            .unwrap();

        let plan = MulticastGroupResource.plan(Some(&created), proposal(&["gw2", "gw3"]));
        assert!(!plan.requires_replace);
        MulticastGroupResource
            .update(&fake, created.clone(), plan.planned_state)
            .await
            .unwrap();

        let id = created["id"].as_str().unwrap().to_string();
        let members: Vec<String> = fake
            .state()
            .multicast_gateways
            .iter()
            .filter(|(group, _)| *group == id)
            .map(|(_, gw)| gw.clone())
            .collect();
        assert_eq!(members, vec!["gw2", "gw3"]);
    }

    #[tokio::test]
    async fn test_configured_gateway_order_is_stable() {
        let fake = fake_with_gateways(&["a", "b"]).await;
        let created = MulticastGroupResource
            .create(&fake, proposal(&["b", "a"]))
            .await
            .unwrap();
        let read = MulticastGroupResource.read(&fake, created).await.unwrap();
        assert_eq!(read["gateway_ids"], json!(["b", "a"]));

        let plan = MulticastGroupResource.plan(Some(&read), proposal(&["b", "a"]));
        assert!(!plan.has_changes());

        let reordered = MulticastGroupResource.plan(Some(&read), proposal(&["a", "b"]));
        assert!(!reordered.has_changes());
        assert_eq!(reordered.planned_state["gateway_ids"], json!(["b", "a"]));

        let grown = MulticastGroupResource.plan(Some(&read), proposal(&["a", "b", "c"]));
        assert_eq!(grown.changes.len(), 1);
        assert_eq!(grown.changes[0].path, "gateway_ids");
    }

    #[test]
    fn test_changing_frequency_replaces() {
        let prior = proposal(&[]);
        let mut proposed = prior.clone();
        proposed["frequency"] = json!(868100000);
        assert!(MulticastGroupResource.plan(Some(&prior), proposed).requires_replace);
    }
}
