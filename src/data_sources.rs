//! List data sources.
//!
//! Each one lists a kind of ChirpStack object, optionally scoped to a tenant
//! or application. `limit` and `search` reach the server unmodified; the
//! result is the config plus an `items` list.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{Chirpstack, ListQuery};
use crate::error::ProviderError;
use crate::resources::to_u32;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

type Result<T> = std::result::Result<T, ProviderError>;

/// The listable object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDataSource {
    Tenants,
    Applications,
    DeviceProfiles,
    Devices,
    Gateways,
    MulticastGroups,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListConfig {
    limit: Option<i64>,
    search: Option<String>,
    tenant_id: Option<String>,
    application_id: Option<String>,
}

impl ListDataSource {
    pub const ALL: [ListDataSource; 6] = [
        Self::Tenants,
        Self::Applications,
        Self::DeviceProfiles,
        Self::Devices,
        Self::Gateways,
        Self::MulticastGroups,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            Self::Tenants => "chirpstack_tenants",
            Self::Applications => "chirpstack_applications",
            Self::DeviceProfiles => "chirpstack_device_profiles",
            Self::Devices => "chirpstack_devices",
            Self::Gateways => "chirpstack_gateways",
            Self::MulticastGroups => "chirpstack_multicast_groups",
        }
    }

    pub fn from_type_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ds| ds.type_name() == name)
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }

    /// The id attribute a listing is scoped by, if any.
    fn scope(self) -> Option<&'static str> {
        match self {
            Self::Tenants => None,
            Self::Applications | Self::DeviceProfiles | Self::Gateways => Some("tenant_id"),
            Self::Devices | Self::MulticastGroups => Some("application_id"),
        }
    }

    fn item_fields(self) -> &'static [&'static str] {
        match self {
            Self::Tenants => &["id", "name"],
            Self::Applications => &["id", "name", "description"],
            Self::DeviceProfiles => &["id", "name", "region"],
            Self::Devices => &[
                "id",
                "name",
                "description",
                "device_profile_id",
                "device_profile_name",
            ],
            Self::Gateways => &["id", "name", "description", "tenant_id"],
            Self::MulticastGroups => &["id", "name", "region", "group_type"],
        }
    }

    pub fn schema(self) -> Schema {
        let item = AttributeType::object(
            self.item_fields()
                .iter()
                .map(|name| (*name, AttributeType::String)),
        );
        let mut schema = Schema::v0()
            .with_description(format!("Lists {}", &self.type_name()["chirpstack_".len()..]))
            .with_attribute(
                "limit",
                Attribute::optional_int64()
                    .with_description("Maximum number of items")
                    .with_default(json!(ListQuery::DEFAULT_LIMIT)),
            )
            .with_attribute(
                "search",
                Attribute::optional_string().with_description("Name filter applied by the server"),
            )
            .with_attribute(
                "items",
                Attribute::new(AttributeType::list(item), AttributeFlags::computed())
                    .with_description("Listed objects"),
            );
        if let Some(scope) = self.scope() {
            schema = schema.with_attribute(
                scope,
                Attribute::required_string().with_description("Scope of the listing"),
            );
        }
        schema
    }

    pub async fn read(self, client: &dyn Chirpstack, config: Value) -> Result<Value> {
        let parsed: ListConfig = if config.is_null() {
            ListConfig::default()
        } else {
            serde_json::from_value(config.clone())?
        };
        let query = ListQuery::new(
            match parsed.limit {
                Some(limit) => to_u32(Some(limit), "limit")?,
                None => ListQuery::DEFAULT_LIMIT,
            },
            parsed.search.unwrap_or_default(),
        );
        let tenant_id = parsed.tenant_id.unwrap_or_default();
        let application_id = parsed.application_id.unwrap_or_default();

        let items: Vec<Value> = match self {
            Self::Tenants => client
                .list_tenants(&query)
                .await?
                .into_iter()
                .map(|t| json!({"id": t.id, "name": t.name}))
                .collect(),
            Self::Applications => client
                .list_applications(&tenant_id, &query)
                .await?
                .into_iter()
                .map(|a| json!({"id": a.id, "name": a.name, "description": a.description}))
                .collect(),
            Self::DeviceProfiles => client
                .list_device_profiles(&tenant_id, &query)
                .await?
                .into_iter()
                .map(|p| {
                    let region = p.region().as_str_name();
                    json!({"id": p.id, "name": p.name, "region": region})
                })
                .collect(),
            Self::Devices => client
                .list_devices(&application_id, &query)
                .await?
                .into_iter()
                .map(|d| {
                    json!({
                        "id": d.dev_eui,
                        "name": d.name,
                        "description": d.description,
                        "device_profile_id": d.device_profile_id,
                        "device_profile_name": d.device_profile_name,
                    })
                })
                .collect(),
            Self::Gateways => client
                .list_gateways(&tenant_id, &query)
                .await?
                .into_iter()
                .map(|g| {
                    json!({
                        "id": g.gateway_id,
                        "name": g.name,
                        "description": g.description,
                        "tenant_id": g.tenant_id,
                    })
                })
                .collect(),
            Self::MulticastGroups => client
                .list_multicast_groups(&application_id, &query)
                .await?
                .into_iter()
                .map(|g| {
                    let region = g.region().as_str_name();
                    let group_type = g.group_type().as_str_name();
                    json!({"id": g.id, "name": g.name, "region": region, "group_type": group_type})
                })
                .collect(),
        };

        let mut state = match config {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        state.insert("limit".to_string(), json!(query.limit));
        state.insert("search".to_string(), json!(query.search));
        state.insert("items".to_string(), Value::Array(items));
        Ok(Value::Object(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChirpstack;

    #[test]
    fn test_lookup_by_type_name() {
        for ds in ListDataSource::ALL {
            assert_eq!(ListDataSource::from_type_name(ds.type_name()).unwrap(), ds);
        }
        assert!(ListDataSource::from_type_name("chirpstack_widgets").is_err());
    }

    #[test]
    fn test_scoped_schemas_require_scope() {
        let schema = ListDataSource::Devices.schema();
        assert!(schema.attributes["application_id"].flags.required);
        assert!(schema.attributes["items"].flags.computed);
        assert!(!ListDataSource::Tenants.schema().attributes.contains_key("tenant_id"));
    }

    #[tokio::test]
    async fn test_defaults_reach_the_server() {
        let fake = FakeChirpstack::new();
        fake.create_tenant("acme", "").await.unwrap();

        let state = ListDataSource::Tenants
            .read(&fake, json!({}))
            .await
            .unwrap();
        assert_eq!(state["items"][0]["name"], "acme");
        assert_eq!(state["limit"], 100);

        let recorded = fake.list_queries();
        assert_eq!(recorded[0].query, ListQuery::default());
    }

    #[tokio::test]
    async fn test_empty_block_reads_with_defaults() {
        let fake = FakeChirpstack::new();
        fake.create_tenant("acme", "").await.unwrap();

        let state = ListDataSource::Tenants
            .read(&fake, Value::Null)
            .await
            .unwrap();
        assert_eq!(state["limit"], 100);
        assert_eq!(state["search"], "");
        assert_eq!(state["items"][0]["name"], "acme");
    }

    #[tokio::test]
    async fn test_limit_search_and_scope_pass_through() {
        let fake = FakeChirpstack::new();
        let state = ListDataSource::Gateways
            .read(&fake, json!({"tenant_id": "t-1", "limit": 7, "search": "roof"}))
            .await
            .unwrap();
        assert_eq!(state["tenant_id"], "t-1");
        assert_eq!(state["items"], json!([]));

        let recorded = fake.list_queries();
        assert_eq!(recorded[0].operation, "list gateways");
        assert_eq!(recorded[0].scope, "t-1");
        assert_eq!(recorded[0].query, ListQuery::new(7, "roof"));
    }

    #[tokio::test]
    async fn test_devices_are_listed_by_dev_eui() {
        let fake = FakeChirpstack::new();
        fake.create_device_record(crate::api::device::Device {
            dev_eui: "0102030405060708".to_string(),
            name: "sensor".to_string(),
            application_id: "app".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let state = ListDataSource::Devices
            .read(&fake, json!({"application_id": "app"}))
            .await
            .unwrap();
        assert_eq!(state["items"][0]["id"], "0102030405060708");
    }

    #[tokio::test]
    async fn test_negative_limit_is_rejected() {
        let fake = FakeChirpstack::new();
        let err = ListDataSource::Tenants
            .read(&fake, json!({"limit": -1}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("limit"));
        assert!(fake.list_queries().is_empty());
    }
}
