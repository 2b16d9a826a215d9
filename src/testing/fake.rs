//! In-memory [`Chirpstack`] for exercising resources without a server.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tonic::{Code, Status};

use crate::api::application::{Application, ApplicationListItem, HttpIntegration};
use crate::api::common::DeviceClass;
use crate::api::device::{
    Device, DeviceActivation, DeviceKeys, DeviceListItem, DeviceQueueItem,
};
use crate::api::device_profile::{DeviceProfile, DeviceProfileListItem};
use crate::api::gateway::{Gateway, GatewayListItem};
use crate::api::multicast_group::{
    MulticastGroup, MulticastGroupListItem, MulticastGroupQueueItem,
};
use crate::api::tenant::{Tenant, TenantListItem};
use crate::client::{Chirpstack, DeviceRecord, ListQuery, NewMulticastGroup};
use crate::error::ProviderError;

type Result<T> = std::result::Result<T, ProviderError>;

/// A list call as the server would have received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedList {
    pub operation: &'static str,
    /// Tenant or application id the list was scoped to; empty for tenants.
    pub scope: String,
    pub query: ListQuery,
}

/// Everything the fake server holds. Exposed so tests can seed and inspect it.
#[derive(Debug, Default)]
pub struct FakeState {
    next_id: u64,
    pub tenants: BTreeMap<String, Tenant>,
    pub applications: BTreeMap<String, Application>,
    pub http_integrations: BTreeMap<String, HttpIntegration>,
    pub device_profiles: BTreeMap<String, DeviceProfile>,
    pub devices: BTreeMap<String, Device>,
    pub device_keys: BTreeMap<String, DeviceKeys>,
    pub activations: BTreeMap<String, DeviceActivation>,
    pub gateways: BTreeMap<String, Gateway>,
    pub multicast_groups: BTreeMap<String, MulticastGroup>,
    /// `(multicast_group_id, gateway_id)` pairs.
    pub multicast_gateways: BTreeSet<(String, String)>,
    pub device_queue: Vec<DeviceQueueItem>,
    pub multicast_queue: Vec<MulticastGroupQueueItem>,
    /// `(operation, key)` for every call, in order.
    pub calls: Vec<(&'static str, String)>,
    pub lists: Vec<RecordedList>,
    failures: HashMap<&'static str, Code>,
}

impl FakeState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("00000000-0000-4000-8000-{:012x}", self.next_id)
    }
}

/// Failures are injected per operation name, e.g. `"create keys for device"`,
/// using the same names the gRPC client reports in its errors.
#[derive(Debug, Default)]
pub struct FakeChirpstack {
    state: Mutex<FakeState>,
}

fn not_found(operation: &'static str, key: &str) -> ProviderError {
    ProviderError::remote(operation, key, Status::not_found("object does not exist"))
}

fn already_exists(operation: &'static str, key: &str) -> ProviderError {
    ProviderError::remote(operation, key, Status::already_exists("object already exists"))
}

fn page<T>(items: impl Iterator<Item = T>, query: &ListQuery) -> Vec<T> {
    items.take(query.limit as usize).collect()
}

fn matches_search(name: &str, query: &ListQuery) -> bool {
    query.search.is_empty() || name.contains(&query.search)
}

impl FakeChirpstack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call to `operation` fail with `code` until cleared.
    pub fn fail_on(&self, operation: &'static str, code: Code) {
        self.state().failures.insert(operation, code);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Operation names of every call so far, without keys.
    pub fn operations(&self) -> Vec<&'static str> {
        self.state().calls.iter().map(|(op, _)| *op).collect()
    }

    pub fn list_queries(&self) -> Vec<RecordedList> {
        self.state().lists.clone()
    }

    fn begin(&self, operation: &'static str, key: &str) -> Result<MutexGuard<'_, FakeState>> {
        let mut state = self.state();
        state.calls.push((operation, key.to_string()));
        if let Some(code) = state.failures.get(operation).copied() {
            return Err(ProviderError::remote(
                operation,
                key,
                Status::new(code, "injected failure"),
            ));
        }
        Ok(state)
    }

    fn begin_list(
        &self,
        operation: &'static str,
        scope: &str,
        query: &ListQuery,
    ) -> Result<MutexGuard<'_, FakeState>> {
        let key = if scope.is_empty() { query.search.as_str() } else { scope };
        let mut state = self.begin(operation, key)?;
        state.lists.push(RecordedList {
            operation,
            scope: scope.to_string(),
            query: query.clone(),
        });
        Ok(state)
    }
}

/// Replace an existing entry or report `NOT_FOUND`.
fn replace<T>(
    map: &mut BTreeMap<String, T>,
    key: String,
    value: T,
    operation: &'static str,
) -> Result<()> {
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value;
            Ok(())
        },
        None => Err(not_found(operation, &key)),
    }
}

fn remove<T>(map: &mut BTreeMap<String, T>, key: &str, operation: &'static str) -> Result<T> {
    map.remove(key).ok_or_else(|| not_found(operation, key))
}

fn fetch<T: Clone>(map: &BTreeMap<String, T>, key: &str, operation: &'static str) -> Result<T> {
    map.get(key).cloned().ok_or_else(|| not_found(operation, key))
}

#[async_trait]
impl Chirpstack for FakeChirpstack {
    async fn create_tenant(&self, name: &str, description: &str) -> Result<String> {
        let mut state = self.begin("create tenant", name)?;
        let id = state.next_id();
        state.tenants.insert(
            id.clone(),
            Tenant {
                id: id.clone(),
                name: name.to_string(),
                description: description.to_string(),
            },
        );
        Ok(id)
    }

    async fn get_tenant(&self, id: &str) -> Result<Tenant> {
        let state = self.begin("get tenant", id)?;
        fetch(&state.tenants, id, "get tenant")
    }

    async fn update_tenant(&self, tenant: Tenant) -> Result<()> {
        let mut state = self.begin("update tenant", &tenant.id)?;
        replace(&mut state.tenants, tenant.id.clone(), tenant, "update tenant")
    }

    async fn delete_tenant(&self, id: &str) -> Result<()> {
        let mut state = self.begin("delete tenant", id)?;
        remove(&mut state.tenants, id, "delete tenant").map(drop)
    }

    async fn list_tenants(&self, query: &ListQuery) -> Result<Vec<TenantListItem>> {
        let state = self.begin_list("list tenants", "", query)?;
        Ok(page(
            state
                .tenants
                .values()
                .filter(|t| matches_search(&t.name, query))
                .map(|t| TenantListItem {
                    id: t.id.clone(),
                    name: t.name.clone(),
                }),
            query,
        ))
    }

    async fn create_application(
        &self,
        tenant_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String> {
        let mut state = self.begin("create application", name)?;
        let id = state.next_id();
        state.applications.insert(
            id.clone(),
            Application {
                id: id.clone(),
                name: name.to_string(),
                description: description.to_string(),
                tenant_id: tenant_id.to_string(),
            },
        );
        Ok(id)
    }

    async fn get_application(&self, id: &str) -> Result<Application> {
        let state = self.begin("get application", id)?;
        fetch(&state.applications, id, "get application")
    }

    async fn update_application(&self, application: Application) -> Result<()> {
        let mut state = self.begin("update application", &application.id)?;
        replace(
            &mut state.applications,
            application.id.clone(),
            application,
            "update application",
        )
    }

    async fn delete_application(&self, id: &str) -> Result<()> {
        let mut state = self.begin("delete application", id)?;
        remove(&mut state.applications, id, "delete application")?;
        state.http_integrations.remove(id);
        Ok(())
    }

    async fn list_applications(
        &self,
        tenant_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<ApplicationListItem>> {
        let state = self.begin_list("list applications", tenant_id, query)?;
        Ok(page(
            state
                .applications
                .values()
                .filter(|a| a.tenant_id == tenant_id && matches_search(&a.name, query))
                .map(|a| ApplicationListItem {
                    id: a.id.clone(),
                    name: a.name.clone(),
                    description: a.description.clone(),
                }),
            query,
        ))
    }

    async fn create_http_integration(&self, integration: HttpIntegration) -> Result<()> {
        let key = integration.application_id.clone();
        let mut state = self.begin("create http integration", &key)?;
        if !state.applications.contains_key(&key) {
            return Err(not_found("create http integration", &key));
        }
        if state.http_integrations.contains_key(&key) {
            return Err(already_exists("create http integration", &key));
        }
        state.http_integrations.insert(key, integration);
        Ok(())
    }

    async fn get_http_integration(&self, application_id: &str) -> Result<HttpIntegration> {
        let state = self.begin("get http integration", application_id)?;
        fetch(&state.http_integrations, application_id, "get http integration")
    }

    async fn update_http_integration(&self, integration: HttpIntegration) -> Result<()> {
        let key = integration.application_id.clone();
        let mut state = self.begin("update http integration", &key)?;
        replace(
            &mut state.http_integrations,
            key,
            integration,
            "update http integration",
        )
    }

    async fn delete_http_integration(&self, application_id: &str) -> Result<()> {
        let mut state = self.begin("delete http integration", application_id)?;
        remove(
            &mut state.http_integrations,
            application_id,
            "delete http integration",
        )
        .map(drop)
    }

    async fn create_device_profile(&self, mut profile: DeviceProfile) -> Result<String> {
        let mut state = self.begin("create device profile", &profile.name)?;
        let id = state.next_id();
        profile.id = id.clone();
        state.device_profiles.insert(id.clone(), profile);
        Ok(id)
    }

    async fn get_device_profile(&self, id: &str) -> Result<DeviceProfile> {
        let state = self.begin("get device profile", id)?;
        fetch(&state.device_profiles, id, "get device profile")
    }

    async fn update_device_profile(&self, profile: DeviceProfile) -> Result<()> {
        let mut state = self.begin("update device profile", &profile.id)?;
        replace(
            &mut state.device_profiles,
            profile.id.clone(),
            profile,
            "update device profile",
        )
    }

    async fn delete_device_profile(&self, id: &str) -> Result<()> {
        let mut state = self.begin("delete device profile", id)?;
        remove(&mut state.device_profiles, id, "delete device profile").map(drop)
    }

    async fn list_device_profiles(
        &self,
        tenant_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<DeviceProfileListItem>> {
        let state = self.begin_list("list device profiles", tenant_id, query)?;
        Ok(page(
            state
                .device_profiles
                .values()
                .filter(|p| p.tenant_id == tenant_id && matches_search(&p.name, query))
                .map(|p| DeviceProfileListItem {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    region: p.region,
                }),
            query,
        ))
    }

    async fn create_device_record(&self, device: Device) -> Result<()> {
        let key = device.dev_eui.clone();
        let mut state = self.begin("create device", &key)?;
        if state.devices.contains_key(&key) {
            return Err(already_exists("create device", &key));
        }
        state.devices.insert(key, device);
        Ok(())
    }

    async fn create_device_keys(&self, keys: DeviceKeys) -> Result<()> {
        let key = keys.dev_eui.clone();
        let mut state = self.begin("create keys for device", &key)?;
        if !state.devices.contains_key(&key) {
            return Err(not_found("create keys for device", &key));
        }
        state.device_keys.insert(key, keys);
        Ok(())
    }

    async fn activate_device(&self, activation: DeviceActivation) -> Result<()> {
        let key = activation.dev_eui.clone();
        let mut state = self.begin("activate device", &key)?;
        if !state.devices.contains_key(&key) {
            return Err(not_found("activate device", &key));
        }
        state.activations.insert(key, activation);
        Ok(())
    }

    async fn get_device_record(&self, dev_eui: &str) -> Result<DeviceRecord> {
        let state = self.begin("get device", dev_eui)?;
        Ok(DeviceRecord {
            device: fetch(&state.devices, dev_eui, "get device")?,
            status: None,
            class_enabled: DeviceClass::ClassA,
        })
    }

    async fn get_device_keys(&self, dev_eui: &str) -> Result<DeviceKeys> {
        let state = self.begin("get keys for device", dev_eui)?;
        fetch(&state.device_keys, dev_eui, "get keys for device")
    }

    async fn get_device_activation(&self, dev_eui: &str) -> Result<DeviceActivation> {
        let state = self.begin("get activation for device", dev_eui)?;
        fetch(&state.activations, dev_eui, "get activation for device")
    }

    async fn update_device(&self, device: Device) -> Result<()> {
        let mut state = self.begin("update device", &device.dev_eui)?;
        replace(
            &mut state.devices,
            device.dev_eui.clone(),
            device,
            "update device",
        )
    }

    async fn delete_device(&self, dev_eui: &str) -> Result<()> {
        let mut state = self.begin("delete device", dev_eui)?;
        remove(&mut state.devices, dev_eui, "delete device")?;
        state.device_keys.remove(dev_eui);
        state.activations.remove(dev_eui);
        Ok(())
    }

    async fn list_devices(
        &self,
        application_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<DeviceListItem>> {
        let state = self.begin_list("list devices", application_id, query)?;
        Ok(page(
            state
                .devices
                .values()
                .filter(|d| d.application_id == application_id && matches_search(&d.name, query))
                .map(|d| DeviceListItem {
                    dev_eui: d.dev_eui.clone(),
                    name: d.name.clone(),
                    description: d.description.clone(),
                    device_profile_id: d.device_profile_id.clone(),
                    device_profile_name: state
                        .device_profiles
                        .get(&d.device_profile_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_default(),
                }),
            query,
        ))
    }

    async fn create_gateway_record(&self, gateway: Gateway) -> Result<()> {
        let key = gateway.gateway_id.clone();
        let mut state = self.begin("create gateway", &key)?;
        if state.gateways.contains_key(&key) {
            return Err(already_exists("create gateway", &key));
        }
        state.gateways.insert(key, gateway);
        Ok(())
    }

    async fn get_gateway(&self, gateway_id: &str) -> Result<Gateway> {
        let state = self.begin("get gateway", gateway_id)?;
        fetch(&state.gateways, gateway_id, "get gateway")
    }

    async fn update_gateway(&self, gateway: Gateway) -> Result<()> {
        let mut state = self.begin("update gateway", &gateway.gateway_id)?;
        replace(
            &mut state.gateways,
            gateway.gateway_id.clone(),
            gateway,
            "update gateway",
        )
    }

    async fn delete_gateway(&self, gateway_id: &str) -> Result<()> {
        let mut state = self.begin("delete gateway", gateway_id)?;
        remove(&mut state.gateways, gateway_id, "delete gateway")?;
        state.multicast_gateways.retain(|(_, gw)| gw != gateway_id);
        Ok(())
    }

    async fn list_gateways(
        &self,
        tenant_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<GatewayListItem>> {
        let state = self.begin_list("list gateways", tenant_id, query)?;
        Ok(page(
            state
                .gateways
                .values()
                .filter(|g| g.tenant_id == tenant_id && matches_search(&g.name, query))
                .map(|g| GatewayListItem {
                    tenant_id: g.tenant_id.clone(),
                    gateway_id: g.gateway_id.clone(),
                    name: g.name.clone(),
                    description: g.description.clone(),
                }),
            query,
        ))
    }

    async fn create_multicast_group(&self, group: NewMulticastGroup) -> Result<String> {
        let mut state = self.begin("create multicast group", &group.name)?;
        let id = state.next_id();
        let mut record = group.record();
        record.id = id.clone();
        state.multicast_groups.insert(id.clone(), record);
        Ok(id)
    }

    async fn get_multicast_group(&self, id: &str) -> Result<MulticastGroup> {
        let state = self.begin("get multicast group", id)?;
        fetch(&state.multicast_groups, id, "get multicast group")
    }

    async fn delete_multicast_group(&self, id: &str) -> Result<()> {
        let mut state = self.begin("delete multicast group", id)?;
        remove(&mut state.multicast_groups, id, "delete multicast group")?;
        state.multicast_gateways.retain(|(group, _)| group != id);
        Ok(())
    }

    async fn list_multicast_groups(
        &self,
        application_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<MulticastGroupListItem>> {
        let state = self.begin_list("list multicast groups", application_id, query)?;
        Ok(page(
            state
                .multicast_groups
                .values()
                .filter(|g| g.application_id == application_id && matches_search(&g.name, query))
                .map(|g| MulticastGroupListItem {
                    id: g.id.clone(),
                    name: g.name.clone(),
                    region: g.region,
                    group_type: g.group_type,
                }),
            query,
        ))
    }

    async fn add_gateway_to_multicast_group(
        &self,
        multicast_group_id: &str,
        gateway_id: &str,
    ) -> Result<()> {
        let key = format!("{}/{}", multicast_group_id, gateway_id);
        let mut state = self.begin("add gateway to multicast group", &key)?;
        if !state.multicast_groups.contains_key(multicast_group_id)
            || !state.gateways.contains_key(gateway_id)
        {
            return Err(not_found("add gateway to multicast group", &key));
        }
        state
            .multicast_gateways
            .insert((multicast_group_id.to_string(), gateway_id.to_string()));
        Ok(())
    }

    async fn remove_gateway_from_multicast_group(
        &self,
        multicast_group_id: &str,
        gateway_id: &str,
    ) -> Result<()> {
        let key = format!("{}/{}", multicast_group_id, gateway_id);
        let mut state = self.begin("remove gateway from multicast group", &key)?;
        let pair = (multicast_group_id.to_string(), gateway_id.to_string());
        if state.multicast_gateways.remove(&pair) {
            Ok(())
        } else {
            Err(not_found("remove gateway from multicast group", &key))
        }
    }

    async fn enqueue(&self, mut item: DeviceQueueItem) -> Result<String> {
        let key = item.dev_eui.clone();
        let mut state = self.begin("enqueue downlink for device", &key)?;
        if !state.devices.contains_key(&key) {
            return Err(not_found("enqueue downlink for device", &key));
        }
        let id = state.next_id();
        item.id = id.clone();
        state.device_queue.push(item);
        Ok(id)
    }

    async fn enqueue_multicast(&self, item: MulticastGroupQueueItem) -> Result<u32> {
        let key = item.multicast_group_id.clone();
        let mut state = self.begin("enqueue downlink for multicast group", &key)?;
        let f_cnt = match state.multicast_groups.get_mut(&key) {
            Some(group) => {
                let assigned = group.f_cnt;
                group.f_cnt += 1;
                assigned
            },
            None => return Err(not_found("enqueue downlink for multicast group", &key)),
        };
        state.multicast_queue.push(MulticastGroupQueueItem { f_cnt, ..item });
        Ok(f_cnt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::Location;
    use crate::client::{NewDevice, NewGateway};

    fn new_device() -> NewDevice {
        NewDevice {
            application_id: "app".to_string(),
            device_profile_id: "dp".to_string(),
            dev_eui: "0102030405060708".to_string(),
            name: "sensor".to_string(),
            dev_addr: "01020304".to_string(),
            app_s_key: "aa".repeat(16),
            nwk_s_enc_key: "bb".repeat(16),
            app_key: "cc".repeat(16),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_tenant_round_trip() {
        let fake = FakeChirpstack::new();
        let id = fake.create_tenant("acme", "d").await.unwrap();
        let tenant = fake.get_tenant(&id).await.unwrap();
        assert_eq!(tenant.id, id);
        assert_eq!(tenant.name, "acme");
        assert_eq!(tenant.description, "d");
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let fake = FakeChirpstack::new();
        let id = fake.create_tenant("acme", "").await.unwrap();
        let renamed = Tenant {
            id: id.clone(),
            name: "acme-2".to_string(),
            description: String::new(),
        };
        fake.update_tenant(renamed.clone()).await.unwrap();
        fake.update_tenant(renamed.clone()).await.unwrap();
        assert_eq!(fake.get_tenant(&id).await.unwrap(), renamed);
    }

    #[tokio::test]
    async fn test_get_after_delete_is_not_found() {
        let fake = FakeChirpstack::new();
        let id = fake.create_tenant("acme", "").await.unwrap();
        fake.delete_tenant(&id).await.unwrap();

        let err = fake.get_tenant(&id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("failed to get tenant"));
    }

    #[tokio::test]
    async fn test_create_device_runs_three_steps_in_order() {
        let fake = FakeChirpstack::new();
        fake.create_device(new_device()).await.unwrap();

        assert_eq!(
            fake.operations(),
            vec!["create device", "create keys for device", "activate device"]
        );
        let view = fake.get_device("0102030405060708").await.unwrap();
        assert_eq!(view.keys.nwk_key, "cc".repeat(16));
        assert_eq!(view.activation.f_nwk_s_int_key, "bb".repeat(16));
    }

    #[tokio::test]
    async fn test_create_device_leaves_record_when_keys_fail() {
        let fake = FakeChirpstack::new();
        fake.fail_on("create keys for device", Code::InvalidArgument);

        let err = fake.create_device(new_device()).await.unwrap_err();
        assert_eq!(err.remote_code(), Some(Code::InvalidArgument));
        assert!(err.to_string().contains("create keys for device"));

        let state = fake.state();
        assert!(state.devices.contains_key("0102030405060708"));
        assert!(state.device_keys.is_empty());
        assert!(state.activations.is_empty());
    }

    #[tokio::test]
    async fn test_create_device_stops_after_failed_activation() {
        let fake = FakeChirpstack::new();
        fake.fail_on("activate device", Code::Internal);

        assert!(fake.create_device(new_device()).await.is_err());
        let state = fake.state();
        assert!(state.devices.contains_key("0102030405060708"));
        assert!(state.device_keys.contains_key("0102030405060708"));
        assert!(state.activations.is_empty());
    }

    #[tokio::test]
    async fn test_get_device_fails_when_any_read_fails() {
        for failing in ["get device", "get keys for device", "get activation for device"] {
            let fake = FakeChirpstack::new();
            fake.create_device(new_device()).await.unwrap();
            fake.fail_on(failing, Code::Unavailable);

            let err = fake.get_device("0102030405060708").await.unwrap_err();
            assert_eq!(err.remote_code(), Some(Code::Unavailable), "{}", failing);
            assert!(err.to_string().contains(failing));
        }
    }

    #[tokio::test]
    async fn test_get_device_stops_at_first_failure() {
        let fake = FakeChirpstack::new();
        fake.create_device(new_device()).await.unwrap();
        fake.fail_on("get keys for device", Code::PermissionDenied);
        fake.state().calls.clear();

        assert!(fake.get_device("0102030405060708").await.is_err());
        assert_eq!(fake.operations(), vec!["get device", "get keys for device"]);

        fake.clear_failures();
        assert!(fake.get_device("0102030405060708").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_passes_limit_and_search_through() {
        let fake = FakeChirpstack::new();
        for name in ["alpha", "beta", "alphabet"] {
            fake.create_tenant(name, "").await.unwrap();
        }

        let query = ListQuery::new(1, "alpha");
        let tenants = fake.list_tenants(&query).await.unwrap();
        assert_eq!(tenants.len(), 1);
        assert!(tenants[0].name.contains("alpha"));

        let recorded = fake.list_queries();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].query, query);
        assert_eq!(recorded[0].operation, "list tenants");
    }

    #[tokio::test]
    async fn test_gateway_create_falls_back_to_update() {
        let fake = FakeChirpstack::new();
        let gateway = NewGateway {
            gateway_id: "0016c001ff10a235".to_string(),
            tenant_id: "t".to_string(),
            location: Location {
                latitude: 52.1,
                longitude: 4.3,
                ..Default::default()
            },
            ..Default::default()
        };
        fake.create_gateway(gateway.clone()).await.unwrap();

        let renamed = NewGateway {
            name: Some("roof".to_string()),
            ..gateway
        };
        fake.create_gateway(renamed).await.unwrap();

        assert_eq!(
            fake.operations(),
            vec!["create gateway", "create gateway", "update gateway"]
        );
        let stored = fake.get_gateway("0016c001ff10a235").await.unwrap();
        assert_eq!(stored.name, "roof");
        assert_eq!(stored.description, "eui-0016c001ff10a235");
    }

    #[tokio::test]
    async fn test_gateway_fallback_reports_update_failure() {
        let fake = FakeChirpstack::new();
        fake.fail_on("create gateway", Code::Internal);
        fake.fail_on("update gateway", Code::PermissionDenied);

        let err = fake
            .create_gateway(NewGateway {
                gateway_id: "0016c001ff10a235".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.remote_code(), Some(Code::PermissionDenied));
    }

    #[tokio::test]
    async fn test_multicast_queue_assigns_frame_counters() {
        let fake = FakeChirpstack::new();
        let id = fake
            .create_multicast_group(NewMulticastGroup {
                name: "all".to_string(),
                f_cnt: 7,
                ..Default::default()
            })
            .await
            .unwrap();

        let item = MulticastGroupQueueItem {
            multicast_group_id: id.clone(),
            f_port: 10,
            data: vec![1, 2],
            ..Default::default()
        };
        assert_eq!(fake.enqueue_multicast(item.clone()).await.unwrap(), 7);
        assert_eq!(fake.enqueue_multicast(item).await.unwrap(), 8);
        assert_eq!(fake.state().multicast_queue.len(), 2);
    }

    #[tokio::test]
    async fn test_multicast_membership() {
        let fake = FakeChirpstack::new();
        let group = fake
            .create_multicast_group(NewMulticastGroup::default())
            .await
            .unwrap();
        fake.create_gateway_record(Gateway {
            gateway_id: "gw".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        fake.add_gateway_to_multicast_group(&group, "gw").await.unwrap();
        fake.remove_gateway_from_multicast_group(&group, "gw")
            .await
            .unwrap();
        let err = fake
            .remove_gateway_from_multicast_group(&group, "gw")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
