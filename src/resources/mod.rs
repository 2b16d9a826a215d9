//! Managed ChirpStack objects.
//!
//! Each resource kind implements [`Resource`] over a typed state model. The
//! provider looks resources up by type name in [`Registry`] and hands them the
//! configured [`Chirpstack`] on every call.

mod application;
mod device;
mod device_profile;
mod gateway;
mod http_integration;
mod multicast_group;
mod tenant;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::Chirpstack;
use crate::error::ProviderError;
use crate::schema::Schema;
use crate::types::{AttributeChange, PlanResult};

pub use application::ApplicationResource;
pub use device::DeviceResource;
pub use device_profile::DeviceProfileResource;
pub use gateway::GatewayResource;
pub use http_integration::HttpIntegrationResource;
pub use multicast_group::MulticastGroupResource;
pub use tenant::TenantResource;

pub(crate) type Result<T> = std::result::Result<T, ProviderError>;

/// One kind of managed remote object.
///
/// State crosses this trait as JSON. Remote failures, including a missing
/// object, are returned as errors.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `chirpstack_tenant`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn plan(&self, prior_state: Option<&Value>, proposed_state: Value) -> PlanResult {
        plan_from_schema(&self.schema(), prior_state, proposed_state)
    }

    async fn create(&self, client: &dyn Chirpstack, planned_state: Value) -> Result<Value>;

    async fn read(&self, client: &dyn Chirpstack, current_state: Value) -> Result<Value>;

    async fn update(
        &self,
        client: &dyn Chirpstack,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value>;

    async fn delete(&self, client: &dyn Chirpstack, current_state: Value) -> Result<()>;

    /// Pass the id through as state and read the object back.
    async fn import(&self, client: &dyn Chirpstack, id: &str) -> Result<Value> {
        let mut state = Map::new();
        state.insert("id".to_string(), Value::String(id.to_string()));
        self.read(client, Value::Object(state)).await
    }
}

/// Resources by type name.
pub struct Registry {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
}

impl Registry {
    pub fn new() -> Self {
        let all: [Box<dyn Resource>; 7] = [
            Box::new(TenantResource),
            Box::new(ApplicationResource),
            Box::new(HttpIntegrationResource),
            Box::new(DeviceProfileResource),
            Box::new(DeviceResource),
            Box::new(GatewayResource),
            Box::new(MulticastGroupResource),
        ];
        Self {
            resources: all.into_iter().map(|r| (r.type_name(), r)).collect(),
        }
    }

    pub fn get(&self, type_name: &str) -> Result<&dyn Resource> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource> {
        self.resources.values().map(|r| r.as_ref())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn field<'a>(state: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    state.and_then(|s| s.get(name)).filter(|v| !v.is_null())
}

/// Diff `proposed_state` against `prior_state` attribute by attribute.
///
/// Computed attributes the proposal leaves null keep their prior value, and
/// unset attributes with a default take it. Replacement is required when an
/// existing object changes a `force_new` attribute. A null proposal plans a
/// delete.
pub fn plan_from_schema(
    schema: &Schema,
    prior_state: Option<&Value>,
    proposed_state: Value,
) -> PlanResult {
    let mut names: Vec<&String> = schema.attributes.keys().collect();
    names.sort();

    if proposed_state.is_null() {
        let changes = names
            .iter()
            .filter_map(|name| {
                field(prior_state, name).map(|v| AttributeChange::between(name.as_str(), Some(v), None))
            })
            .collect();
        return PlanResult {
            planned_state: Value::Null,
            changes,
            requires_replace: false,
        };
    }

    let mut planned = match proposed_state {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for name in &names {
        let attr = &schema.attributes[*name];
        if planned.get(name.as_str()).is_some_and(|v| !v.is_null()) {
            continue;
        }
        if attr.flags.computed {
            if let Some(prior) = field(prior_state, name) {
                planned.insert((*name).clone(), prior.clone());
                continue;
            }
        }
        if let Some(default) = &attr.default {
            planned.insert((*name).clone(), default.clone());
        }
    }

    let planned_state = Value::Object(planned);
    let mut changes = Vec::new();
    let mut requires_replace = false;
    for name in names {
        let before = field(prior_state, name);
        let after = field(Some(&planned_state), name);
        if before == after {
            continue;
        }
        if prior_state.is_some() && schema.forces_new(name) {
            requires_replace = true;
        }
        changes.push(AttributeChange::between(name.as_str(), before, after));
    }

    PlanResult {
        planned_state,
        changes,
        requires_replace,
    }
}

pub(crate) fn decode<T: DeserializeOwned>(state: Value) -> Result<T> {
    Ok(serde_json::from_value(state)?)
}

pub(crate) fn encode<T: Serialize>(model: &T) -> Result<Value> {
    Ok(serde_json::to_value(model)?)
}

/// The `id` a stored state must carry.
pub(crate) fn require_id(id: &Option<String>, type_name: &str) -> Result<String> {
    match id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ProviderError::Serialization(serde::de::Error::custom(format!(
            "{} state has no id",
            type_name
        )))),
    }
}

/// Empty remote strings stay null in state.
pub(crate) fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

/// Protobuf counters and intervals are `u32`; state carries `i64`.
pub(crate) fn to_u32(value: Option<i64>, attribute: &str) -> Result<u32> {
    let value = value.unwrap_or_default();
    u32::try_from(value).map_err(|_| {
        ProviderError::Serialization(serde::de::Error::custom(format!(
            "{} is out of range: {}",
            attribute, value
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::v0()
            .with_id("Id")
            .with_attribute("tenant_id", Attribute::required_string().with_force_new())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("class_c_timeout", Attribute::optional_computed_int64())
            .with_attribute(
                "limit",
                Attribute::optional_int64().with_default(json!(100)),
            )
    }

    #[test]
    fn test_create_plan_lists_set_attributes() {
        let plan = plan_from_schema(&schema(), None, json!({"tenant_id": "t", "name": "n"}));
        let paths: Vec<&str> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["limit", "name", "tenant_id"]);
        assert!(!plan.requires_replace);
        assert_eq!(plan.planned_state["limit"], 100);
    }

    #[test]
    fn test_computed_values_survive_from_prior_state() {
        let prior = json!({"id": "x", "tenant_id": "t", "name": "n", "class_c_timeout": 5, "limit": 100});
        let plan = plan_from_schema(
            &schema(),
            Some(&prior),
            json!({"id": null, "tenant_id": "t", "name": "n"}),
        );
        assert_eq!(plan.planned_state["id"], "x");
        assert_eq!(plan.planned_state["class_c_timeout"], 5);
        assert!(!plan.has_changes());
    }

    #[test]
    fn test_force_new_change_requires_replace() {
        let prior = json!({"id": "x", "tenant_id": "t", "name": "n"});
        let plan = plan_from_schema(&schema(), Some(&prior), json!({"tenant_id": "u", "name": "n"}));
        assert!(plan.requires_replace);

        let rename = plan_from_schema(&schema(), Some(&prior), json!({"tenant_id": "t", "name": "m"}));
        assert!(!rename.requires_replace);
        assert_eq!(rename.changes.len(), 2);
    }

    #[test]
    fn test_clearing_optional_attribute() {
        let prior = json!({"id": "x", "tenant_id": "t", "name": "n", "description": "d", "limit": 100});
        let plan = plan_from_schema(&schema(), Some(&prior), json!({"tenant_id": "t", "name": "n"}));
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "description");
        assert!(plan.changes[0].after.is_none());
    }

    #[test]
    fn test_null_proposal_plans_delete() {
        let prior = json!({"id": "x", "name": "n"});
        let plan = plan_from_schema(&schema(), Some(&prior), Value::Null);
        assert!(plan.planned_state.is_null());
        assert_eq!(plan.changes.len(), 2);
    }

    #[test]
    fn test_registry_lookup() {
        let registry = Registry::new();
        assert_eq!(registry.iter().count(), 7);
        assert_eq!(
            registry.get("chirpstack_tenant").unwrap().type_name(),
            "chirpstack_tenant"
        );
        assert!(matches!(
            registry.get("chirpstack_widget"),
            Err(ProviderError::UnknownResource(_))
        ));
    }

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(&Some("a".into()), "t").unwrap(), "a");
        assert!(require_id(&Some(String::new()), "t").is_err());
        assert!(require_id(&None, "t").is_err());
    }

    #[test]
    fn test_to_u32_range() {
        assert_eq!(to_u32(Some(3600), "x").unwrap(), 3600);
        assert_eq!(to_u32(None, "x").unwrap(), 0);
        assert!(to_u32(Some(-1), "x").is_err());
    }
}
