//! Typed façade over the ChirpStack administrative API.
//!
//! [`Chirpstack`] has one method per remote call. Each method issues a single
//! unary RPC, wraps a failure with the operation and key it was issued for,
//! and returns the interesting part of the response. Nothing is retried,
//! batched or cached.
//!
//! The device calls [`Chirpstack::create_device`] and
//! [`Chirpstack::get_device`] are ordered sequences of three calls each. They
//! stop at the first failure. A failed read returns no partial view; a failed
//! create leaves the earlier steps in place on the server.

pub mod channel;
mod grpc;
pub mod model;

use async_trait::async_trait;
use tracing::warn;

use crate::api::application::{Application, ApplicationListItem, HttpIntegration};
use crate::api::device::{
    Device, DeviceActivation, DeviceKeys, DeviceListItem, DeviceQueueItem,
};
use crate::api::device_profile::{DeviceProfile, DeviceProfileListItem};
use crate::api::gateway::{Gateway, GatewayListItem};
use crate::api::multicast_group::{
    MulticastGroup, MulticastGroupListItem, MulticastGroupQueueItem,
};
use crate::api::tenant::{Tenant, TenantListItem};
use crate::error::ProviderError;

pub use channel::{connect, AuthChannel, BearerToken, CONNECT_TIMEOUT};
pub use grpc::GrpcChirpstack;
pub use model::{DeviceRecord, DeviceView, ListQuery, NewDevice, NewGateway, NewMulticastGroup};

type Result<T> = std::result::Result<T, ProviderError>;

/// The ChirpStack operations the provider needs.
///
/// Implementations must be cheap to share: one instance is built per provider
/// configuration and used concurrently by every resource.
#[async_trait]
pub trait Chirpstack: Send + Sync {
    // Tenants

    /// Create a tenant and return its id.
    async fn create_tenant(&self, name: &str, description: &str) -> Result<String>;
    async fn get_tenant(&self, id: &str) -> Result<Tenant>;
    async fn update_tenant(&self, tenant: Tenant) -> Result<()>;
    async fn delete_tenant(&self, id: &str) -> Result<()>;
    async fn list_tenants(&self, query: &ListQuery) -> Result<Vec<TenantListItem>>;

    // Applications

    /// Create an application under `tenant_id` and return its id.
    async fn create_application(
        &self,
        tenant_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String>;
    async fn get_application(&self, id: &str) -> Result<Application>;
    async fn update_application(&self, application: Application) -> Result<()>;
    async fn delete_application(&self, id: &str) -> Result<()>;
    async fn list_applications(
        &self,
        tenant_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<ApplicationListItem>>;

    // HTTP integrations, keyed by application id

    async fn create_http_integration(&self, integration: HttpIntegration) -> Result<()>;
    async fn get_http_integration(&self, application_id: &str) -> Result<HttpIntegration>;
    async fn update_http_integration(&self, integration: HttpIntegration) -> Result<()>;
    async fn delete_http_integration(&self, application_id: &str) -> Result<()>;

    // Device profiles

    /// Create a device profile and return its id.
    async fn create_device_profile(&self, profile: DeviceProfile) -> Result<String>;
    async fn get_device_profile(&self, id: &str) -> Result<DeviceProfile>;
    async fn update_device_profile(&self, profile: DeviceProfile) -> Result<()>;
    async fn delete_device_profile(&self, id: &str) -> Result<()>;
    async fn list_device_profiles(
        &self,
        tenant_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<DeviceProfileListItem>>;

    // Devices

    async fn create_device_record(&self, device: Device) -> Result<()>;
    async fn create_device_keys(&self, keys: DeviceKeys) -> Result<()>;
    async fn activate_device(&self, activation: DeviceActivation) -> Result<()>;
    async fn get_device_record(&self, dev_eui: &str) -> Result<DeviceRecord>;
    async fn get_device_keys(&self, dev_eui: &str) -> Result<DeviceKeys>;
    async fn get_device_activation(&self, dev_eui: &str) -> Result<DeviceActivation>;
    async fn update_device(&self, device: Device) -> Result<()>;
    async fn delete_device(&self, dev_eui: &str) -> Result<()>;
    async fn list_devices(
        &self,
        application_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<DeviceListItem>>;

    /// Register and activate a device: record, then keys, then activation.
    ///
    /// There is no rollback. If keys or activation fail, the device record
    /// already exists on the server and must be reconciled by the caller.
    async fn create_device(&self, device: NewDevice) -> Result<()> {
        self.create_device_record(device.record()).await?;
        self.create_device_keys(device.keys()).await?;
        self.activate_device(device.activation()).await
    }

    /// Read a device with its keys and activation. Any failing read fails the
    /// whole call.
    async fn get_device(&self, dev_eui: &str) -> Result<DeviceView> {
        let record = self.get_device_record(dev_eui).await?;
        let keys = self.get_device_keys(dev_eui).await?;
        let activation = self.get_device_activation(dev_eui).await?;
        Ok(DeviceView::new(record, keys, activation))
    }

    // Gateways

    async fn create_gateway_record(&self, gateway: Gateway) -> Result<()>;
    async fn get_gateway(&self, gateway_id: &str) -> Result<Gateway>;
    async fn update_gateway(&self, gateway: Gateway) -> Result<()>;
    async fn delete_gateway(&self, gateway_id: &str) -> Result<()>;
    async fn list_gateways(
        &self,
        tenant_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<GatewayListItem>>;

    /// Create a gateway, or overwrite it if it already exists.
    ///
    /// A failed create falls through to an update with the same record; only
    /// the update's failure is reported.
    async fn create_gateway(&self, gateway: NewGateway) -> Result<()> {
        let record = gateway.record();
        if let Err(err) = self.create_gateway_record(record.clone()).await {
            warn!(gateway_id = %record.gateway_id, error = %err, "Gateway create failed, updating instead");
            self.update_gateway(record).await?;
        }
        Ok(())
    }

    // Multicast groups

    /// Create a Class-C multicast group and return its id.
    async fn create_multicast_group(&self, group: NewMulticastGroup) -> Result<String>;
    async fn get_multicast_group(&self, id: &str) -> Result<MulticastGroup>;
    async fn delete_multicast_group(&self, id: &str) -> Result<()>;
    async fn list_multicast_groups(
        &self,
        application_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<MulticastGroupListItem>>;
    async fn add_gateway_to_multicast_group(
        &self,
        multicast_group_id: &str,
        gateway_id: &str,
    ) -> Result<()>;
    async fn remove_gateway_from_multicast_group(
        &self,
        multicast_group_id: &str,
        gateway_id: &str,
    ) -> Result<()>;

    // Message queues

    /// Queue a downlink for one device and return the queue item id.
    async fn enqueue(&self, item: DeviceQueueItem) -> Result<String>;
    /// Queue a downlink for a multicast group and return the frame counter
    /// it was assigned.
    async fn enqueue_multicast(&self, item: MulticastGroupQueueItem) -> Result<u32>;
}
