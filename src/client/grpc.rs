//! [`Chirpstack`] over the authenticated gRPC channel.

use async_trait::async_trait;
use tonic::client::Grpc;
use tonic::Status;
use tracing::instrument;

use super::channel::AuthChannel;
use super::model::{DeviceRecord, ListQuery, NewMulticastGroup};
use super::{Chirpstack, Result};
use crate::api::application::{self as app, Application, ApplicationListItem, HttpIntegration};
use crate::api::common::DeviceClass;
use crate::api::device::{
    self as dev, Device, DeviceActivation, DeviceKeys, DeviceListItem, DeviceQueueItem,
};
use crate::api::device_profile::{self as dp, DeviceProfile, DeviceProfileListItem};
use crate::api::gateway::{self as gw, Gateway, GatewayListItem};
use crate::api::multicast_group::{
    self as mc, MulticastGroup, MulticastGroupListItem, MulticastGroupQueueItem,
};
use crate::api::tenant::{self as tn, Tenant, TenantListItem};
use crate::api::{self, Empty};
use crate::error::ProviderError;

/// The production [`Chirpstack`]. Cloning is cheap and shares the channel.
#[derive(Debug, Clone)]
pub struct GrpcChirpstack {
    inner: Grpc<AuthChannel>,
}

impl GrpcChirpstack {
    pub fn new(channel: AuthChannel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }

    async fn call<Req, Resp>(
        &self,
        operation: &'static str,
        key: &str,
        path: &'static str,
        request: Req,
    ) -> Result<Resp>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.inner.clone();
        api::unary(&mut grpc, path, request)
            .await
            .map_err(|status| ProviderError::remote(operation, key, status))
    }
}

/// Unwrap the message a successful response must carry.
fn present<T>(value: Option<T>, operation: &'static str, key: &str) -> Result<T> {
    value.ok_or_else(|| {
        ProviderError::remote(operation, key, Status::internal("response carried no record"))
    })
}

#[async_trait]
impl Chirpstack for GrpcChirpstack {
    #[instrument(skip(self, description))]
    async fn create_tenant(&self, name: &str, description: &str) -> Result<String> {
        let request = tn::CreateTenantRequest {
            tenant: Some(Tenant {
                id: String::new(),
                name: name.to_string(),
                description: description.to_string(),
            }),
        };
        let response: tn::CreateTenantResponse =
            self.call("create tenant", name, tn::CREATE, request).await?;
        Ok(response.id)
    }

    #[instrument(skip(self))]
    async fn get_tenant(&self, id: &str) -> Result<Tenant> {
        let request = tn::GetTenantRequest { id: id.to_string() };
        let response: tn::GetTenantResponse =
            self.call("get tenant", id, tn::GET, request).await?;
        present(response.tenant, "get tenant", id)
    }

    #[instrument(skip_all, fields(id = %tenant.id))]
    async fn update_tenant(&self, tenant: Tenant) -> Result<()> {
        let id = tenant.id.clone();
        let request = tn::UpdateTenantRequest {
            tenant: Some(tenant),
        };
        let _: Empty = self.call("update tenant", &id, tn::UPDATE, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_tenant(&self, id: &str) -> Result<()> {
        let request = tn::DeleteTenantRequest { id: id.to_string() };
        let _: Empty = self.call("delete tenant", id, tn::DELETE, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_tenants(&self, query: &ListQuery) -> Result<Vec<TenantListItem>> {
        let request = tn::ListTenantsRequest {
            limit: query.limit,
            offset: 0,
            search: query.search.clone(),
        };
        let response: tn::ListTenantsResponse = self
            .call("list tenants", &query.search, tn::LIST, request)
            .await?;
        Ok(response.result)
    }

    #[instrument(skip(self, description))]
    async fn create_application(
        &self,
        tenant_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String> {
        let request = app::CreateApplicationRequest {
            application: Some(Application {
                id: String::new(),
                name: name.to_string(),
                description: description.to_string(),
                tenant_id: tenant_id.to_string(),
            }),
        };
        let response: app::CreateApplicationResponse = self
            .call("create application", name, app::CREATE, request)
            .await?;
        Ok(response.id)
    }

    #[instrument(skip(self))]
    async fn get_application(&self, id: &str) -> Result<Application> {
        let request = app::GetApplicationRequest { id: id.to_string() };
        let response: app::GetApplicationResponse =
            self.call("get application", id, app::GET, request).await?;
        present(response.application, "get application", id)
    }

    #[instrument(skip_all, fields(id = %application.id))]
    async fn update_application(&self, application: Application) -> Result<()> {
        let id = application.id.clone();
        let request = app::UpdateApplicationRequest {
            application: Some(application),
        };
        let _: Empty = self
            .call("update application", &id, app::UPDATE, request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_application(&self, id: &str) -> Result<()> {
        let request = app::DeleteApplicationRequest { id: id.to_string() };
        let _: Empty = self
            .call("delete application", id, app::DELETE, request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_applications(
        &self,
        tenant_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<ApplicationListItem>> {
        let request = app::ListApplicationsRequest {
            limit: query.limit,
            offset: 0,
            search: query.search.clone(),
            tenant_id: tenant_id.to_string(),
        };
        let response: app::ListApplicationsResponse = self
            .call("list applications", tenant_id, app::LIST, request)
            .await?;
        Ok(response.result)
    }

    #[instrument(skip_all, fields(application_id = %integration.application_id))]
    async fn create_http_integration(&self, integration: HttpIntegration) -> Result<()> {
        let key = integration.application_id.clone();
        let request = app::CreateHttpIntegrationRequest {
            integration: Some(integration),
        };
        let _: Empty = self
            .call(
                "create http integration",
                &key,
                app::CREATE_HTTP_INTEGRATION,
                request,
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_http_integration(&self, application_id: &str) -> Result<HttpIntegration> {
        let request = app::GetHttpIntegrationRequest {
            application_id: application_id.to_string(),
        };
        let response: app::GetHttpIntegrationResponse = self
            .call(
                "get http integration",
                application_id,
                app::GET_HTTP_INTEGRATION,
                request,
            )
            .await?;
        present(response.integration, "get http integration", application_id)
    }

    #[instrument(skip_all, fields(application_id = %integration.application_id))]
    async fn update_http_integration(&self, integration: HttpIntegration) -> Result<()> {
        let key = integration.application_id.clone();
        let request = app::UpdateHttpIntegrationRequest {
            integration: Some(integration),
        };
        let _: Empty = self
            .call(
                "update http integration",
                &key,
                app::UPDATE_HTTP_INTEGRATION,
                request,
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_http_integration(&self, application_id: &str) -> Result<()> {
        let request = app::DeleteHttpIntegrationRequest {
            application_id: application_id.to_string(),
        };
        let _: Empty = self
            .call(
                "delete http integration",
                application_id,
                app::DELETE_HTTP_INTEGRATION,
                request,
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(name = %profile.name))]
    async fn create_device_profile(&self, profile: DeviceProfile) -> Result<String> {
        let key = profile.name.clone();
        let request = dp::CreateDeviceProfileRequest {
            device_profile: Some(profile),
        };
        let response: dp::CreateDeviceProfileResponse = self
            .call("create device profile", &key, dp::CREATE, request)
            .await?;
        Ok(response.id)
    }

    #[instrument(skip(self))]
    async fn get_device_profile(&self, id: &str) -> Result<DeviceProfile> {
        let request = dp::GetDeviceProfileRequest { id: id.to_string() };
        let response: dp::GetDeviceProfileResponse = self
            .call("get device profile", id, dp::GET, request)
            .await?;
        present(response.device_profile, "get device profile", id)
    }

    #[instrument(skip_all, fields(id = %profile.id))]
    async fn update_device_profile(&self, profile: DeviceProfile) -> Result<()> {
        let id = profile.id.clone();
        let request = dp::UpdateDeviceProfileRequest {
            device_profile: Some(profile),
        };
        let _: Empty = self
            .call("update device profile", &id, dp::UPDATE, request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_device_profile(&self, id: &str) -> Result<()> {
        let request = dp::DeleteDeviceProfileRequest { id: id.to_string() };
        let _: Empty = self
            .call("delete device profile", id, dp::DELETE, request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_device_profiles(
        &self,
        tenant_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<DeviceProfileListItem>> {
        let request = dp::ListDeviceProfilesRequest {
            limit: query.limit,
            offset: 0,
            search: query.search.clone(),
            tenant_id: tenant_id.to_string(),
        };
        let response: dp::ListDeviceProfilesResponse = self
            .call("list device profiles", tenant_id, dp::LIST, request)
            .await?;
        Ok(response.result)
    }

    #[instrument(skip_all, fields(dev_eui = %device.dev_eui))]
    async fn create_device_record(&self, device: Device) -> Result<()> {
        let key = device.dev_eui.clone();
        let request = dev::CreateDeviceRequest {
            device: Some(device),
        };
        let _: Empty = self.call("create device", &key, dev::CREATE, request).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(dev_eui = %keys.dev_eui))]
    async fn create_device_keys(&self, keys: DeviceKeys) -> Result<()> {
        let key = keys.dev_eui.clone();
        let request = dev::CreateDeviceKeysRequest {
            device_keys: Some(keys),
        };
        let _: Empty = self
            .call("create keys for device", &key, dev::CREATE_KEYS, request)
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(dev_eui = %activation.dev_eui))]
    async fn activate_device(&self, activation: DeviceActivation) -> Result<()> {
        let key = activation.dev_eui.clone();
        let request = dev::ActivateDeviceRequest {
            device_activation: Some(activation),
        };
        let _: Empty = self
            .call("activate device", &key, dev::ACTIVATE, request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_device_record(&self, dev_eui: &str) -> Result<DeviceRecord> {
        let request = dev::GetDeviceRequest {
            dev_eui: dev_eui.to_string(),
        };
        let response: dev::GetDeviceResponse =
            self.call("get device", dev_eui, dev::GET, request).await?;
        let class_enabled = DeviceClass::try_from(response.class_enabled).unwrap_or_default();
        Ok(DeviceRecord {
            device: present(response.device, "get device", dev_eui)?,
            status: response.device_status,
            class_enabled,
        })
    }

    #[instrument(skip(self))]
    async fn get_device_keys(&self, dev_eui: &str) -> Result<DeviceKeys> {
        let request = dev::GetDeviceKeysRequest {
            dev_eui: dev_eui.to_string(),
        };
        let response: dev::GetDeviceKeysResponse = self
            .call("get keys for device", dev_eui, dev::GET_KEYS, request)
            .await?;
        present(response.device_keys, "get keys for device", dev_eui)
    }

    #[instrument(skip(self))]
    async fn get_device_activation(&self, dev_eui: &str) -> Result<DeviceActivation> {
        let request = dev::GetDeviceActivationRequest {
            dev_eui: dev_eui.to_string(),
        };
        let response: dev::GetDeviceActivationResponse = self
            .call(
                "get activation for device",
                dev_eui,
                dev::GET_ACTIVATION,
                request,
            )
            .await?;
        present(
            response.device_activation,
            "get activation for device",
            dev_eui,
        )
    }

    #[instrument(skip_all, fields(dev_eui = %device.dev_eui))]
    async fn update_device(&self, device: Device) -> Result<()> {
        let key = device.dev_eui.clone();
        let request = dev::UpdateDeviceRequest {
            device: Some(device),
        };
        let _: Empty = self.call("update device", &key, dev::UPDATE, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_device(&self, dev_eui: &str) -> Result<()> {
        let request = dev::DeleteDeviceRequest {
            dev_eui: dev_eui.to_string(),
        };
        let _: Empty = self
            .call("delete device", dev_eui, dev::DELETE, request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_devices(
        &self,
        application_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<DeviceListItem>> {
        let request = dev::ListDevicesRequest {
            limit: query.limit,
            offset: 0,
            search: query.search.clone(),
            application_id: application_id.to_string(),
        };
        let response: dev::ListDevicesResponse = self
            .call("list devices", application_id, dev::LIST, request)
            .await?;
        Ok(response.result)
    }

    #[instrument(skip_all, fields(gateway_id = %gateway.gateway_id))]
    async fn create_gateway_record(&self, gateway: Gateway) -> Result<()> {
        let key = gateway.gateway_id.clone();
        let request = gw::CreateGatewayRequest {
            gateway: Some(gateway),
        };
        let _: Empty = self.call("create gateway", &key, gw::CREATE, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_gateway(&self, gateway_id: &str) -> Result<Gateway> {
        let request = gw::GetGatewayRequest {
            gateway_id: gateway_id.to_string(),
        };
        let response: gw::GetGatewayResponse =
            self.call("get gateway", gateway_id, gw::GET, request).await?;
        present(response.gateway, "get gateway", gateway_id)
    }

    #[instrument(skip_all, fields(gateway_id = %gateway.gateway_id))]
    async fn update_gateway(&self, gateway: Gateway) -> Result<()> {
        let key = gateway.gateway_id.clone();
        let request = gw::UpdateGatewayRequest {
            gateway: Some(gateway),
        };
        let _: Empty = self.call("update gateway", &key, gw::UPDATE, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_gateway(&self, gateway_id: &str) -> Result<()> {
        let request = gw::DeleteGatewayRequest {
            gateway_id: gateway_id.to_string(),
        };
        let _: Empty = self
            .call("delete gateway", gateway_id, gw::DELETE, request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_gateways(
        &self,
        tenant_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<GatewayListItem>> {
        let request = gw::ListGatewaysRequest {
            limit: query.limit,
            offset: 0,
            search: query.search.clone(),
            tenant_id: tenant_id.to_string(),
        };
        let response: gw::ListGatewaysResponse = self
            .call("list gateways", tenant_id, gw::LIST, request)
            .await?;
        Ok(response.result)
    }

    #[instrument(skip(self))]
    async fn create_multicast_group(&self, group: NewMulticastGroup) -> Result<String> {
        let request = mc::CreateMulticastGroupRequest {
            multicast_group: Some(group.record()),
        };
        let response: mc::CreateMulticastGroupResponse = self
            .call("create multicast group", &group.name, mc::CREATE, request)
            .await?;
        Ok(response.id)
    }

    #[instrument(skip(self))]
    async fn get_multicast_group(&self, id: &str) -> Result<MulticastGroup> {
        let request = mc::GetMulticastGroupRequest { id: id.to_string() };
        let response: mc::GetMulticastGroupResponse = self
            .call("get multicast group", id, mc::GET, request)
            .await?;
        present(response.multicast_group, "get multicast group", id)
    }

    #[instrument(skip(self))]
    async fn delete_multicast_group(&self, id: &str) -> Result<()> {
        let request = mc::DeleteMulticastGroupRequest { id: id.to_string() };
        let _: Empty = self
            .call("delete multicast group", id, mc::DELETE, request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_multicast_groups(
        &self,
        application_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<MulticastGroupListItem>> {
        let request = mc::ListMulticastGroupsRequest {
            limit: query.limit,
            offset: 0,
            search: query.search.clone(),
            application_id: application_id.to_string(),
        };
        let response: mc::ListMulticastGroupsResponse = self
            .call("list multicast groups", application_id, mc::LIST, request)
            .await?;
        Ok(response.result)
    }

    #[instrument(skip(self))]
    async fn add_gateway_to_multicast_group(
        &self,
        multicast_group_id: &str,
        gateway_id: &str,
    ) -> Result<()> {
        let request = mc::AddGatewayToMulticastGroupRequest {
            multicast_group_id: multicast_group_id.to_string(),
            gateway_id: gateway_id.to_string(),
        };
        let key = format!("{}/{}", multicast_group_id, gateway_id);
        let _: Empty = self
            .call(
                "add gateway to multicast group",
                &key,
                mc::ADD_GATEWAY,
                request,
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_gateway_from_multicast_group(
        &self,
        multicast_group_id: &str,
        gateway_id: &str,
    ) -> Result<()> {
        let request = mc::RemoveGatewayFromMulticastGroupRequest {
            multicast_group_id: multicast_group_id.to_string(),
            gateway_id: gateway_id.to_string(),
        };
        let key = format!("{}/{}", multicast_group_id, gateway_id);
        let _: Empty = self
            .call(
                "remove gateway from multicast group",
                &key,
                mc::REMOVE_GATEWAY,
                request,
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(dev_eui = %item.dev_eui, f_port = item.f_port))]
    async fn enqueue(&self, item: DeviceQueueItem) -> Result<String> {
        let key = item.dev_eui.clone();
        let request = dev::EnqueueDeviceQueueItemRequest {
            queue_item: Some(item),
        };
        let response: dev::EnqueueDeviceQueueItemResponse = self
            .call("enqueue downlink for device", &key, dev::ENQUEUE, request)
            .await?;
        Ok(response.id)
    }

    #[instrument(skip_all, fields(multicast_group_id = %item.multicast_group_id, f_port = item.f_port))]
    async fn enqueue_multicast(&self, item: MulticastGroupQueueItem) -> Result<u32> {
        let key = item.multicast_group_id.clone();
        let request = mc::EnqueueMulticastGroupQueueItemRequest {
            queue_item: Some(item),
        };
        let response: mc::EnqueueMulticastGroupQueueItemResponse = self
            .call(
                "enqueue downlink for multicast group",
                &key,
                mc::ENQUEUE,
                request,
            )
            .await?;
        Ok(response.f_cnt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::channel::{connect, tests::self_signed};
    use crate::config::ConnectionSettings;
    use std::convert::Infallible;
    use std::marker::PhantomData;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;
    use tonic::codegen::{http, Body, BoxFuture, Context, Poll, Service, StdError};
    use tonic::transport::{Identity, Server, ServerTlsConfig};

    /// What the fake ChirpStack server saw.
    #[derive(Debug, Default)]
    struct Seen {
        authorization: Vec<String>,
        paths: Vec<String>,
        list_tenants: Vec<(u32, String)>,
    }

    type Recorder = Arc<Mutex<Seen>>;

    /// One unary method backed by a plain function.
    struct Reply<Req, Resp> {
        seen: Recorder,
        handler: fn(&Recorder, Req) -> std::result::Result<Resp, Status>,
        _types: PhantomData<fn(Req) -> Resp>,
    }

    impl<Req, Resp> Reply<Req, Resp> {
        fn new(
            seen: Recorder,
            handler: fn(&Recorder, Req) -> std::result::Result<Resp, Status>,
        ) -> Self {
            Self {
                seen,
                handler,
                _types: PhantomData,
            }
        }
    }

    impl<Req, Resp> tonic::server::UnaryService<Req> for Reply<Req, Resp>
    where
        Resp: Send + 'static,
    {
        type Response = Resp;
        type Future = BoxFuture<tonic::Response<Resp>, Status>;

        fn call(&mut self, request: tonic::Request<Req>) -> Self::Future {
            let result = (self.handler)(&self.seen, request.into_inner());
            Box::pin(async move { result.map(tonic::Response::new) })
        }
    }

    async fn answer<B, Req, Resp>(
        req: http::Request<B>,
        reply: Reply<Req, Resp>,
    ) -> http::Response<tonic::body::Body>
    where
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
        Req: prost::Message + Default + Send + 'static,
        Resp: prost::Message + Send + 'static,
    {
        let mut grpc = tonic::server::Grpc::new(tonic_prost::ProstCodec::<Resp, Req>::default());
        grpc.unary(reply, req).await
    }

    fn list_tenants(
        seen: &Recorder,
        request: tn::ListTenantsRequest,
    ) -> std::result::Result<tn::ListTenantsResponse, Status> {
        seen.lock()
            .unwrap()
            .list_tenants
            .push((request.limit, request.search));
        Ok(tn::ListTenantsResponse {
            total_count: 1,
            result: vec![TenantListItem {
                id: "t-1".to_string(),
                name: "acme".to_string(),
            }],
        })
    }

    fn get_device(
        _: &Recorder,
        request: dev::GetDeviceRequest,
    ) -> std::result::Result<dev::GetDeviceResponse, Status> {
        Ok(dev::GetDeviceResponse {
            device: Some(Device {
                dev_eui: request.dev_eui,
                name: "meter".to_string(),
                application_id: "app".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn get_keys(
        _: &Recorder,
        request: dev::GetDeviceKeysRequest,
    ) -> std::result::Result<dev::GetDeviceKeysResponse, Status> {
        Err(Status::not_found(format!("no keys for {}", request.dev_eui)))
    }

    fn route<B>(
        seen: &Recorder,
        req: http::Request<B>,
    ) -> BoxFuture<http::Response<tonic::body::Body>, Infallible>
    where
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        {
            let mut log = seen.lock().unwrap();
            log.paths.push(req.uri().path().to_string());
            if let Some(value) = req.headers().get("authorization") {
                log.authorization
                    .push(value.to_str().unwrap_or_default().to_string());
            }
        }

        let seen = Arc::clone(seen);
        match req.uri().path() {
            tn::LIST => Box::pin(async move {
                Ok(answer(req, Reply::new(seen, list_tenants)).await)
            }),
            dev::GET => Box::pin(async move { Ok(answer(req, Reply::new(seen, get_device)).await) }),
            dev::GET_KEYS => {
                Box::pin(async move { Ok(answer(req, Reply::new(seen, get_keys)).await) })
            },
            _ => Box::pin(async move {
                let mut response = http::Response::new(tonic::body::Body::default());
                let headers = response.headers_mut();
                headers.insert(
                    Status::GRPC_STATUS,
                    (tonic::Code::Unimplemented as i32).into(),
                );
                headers.insert(
                    http::header::CONTENT_TYPE,
                    tonic::metadata::GRPC_CONTENT_TYPE,
                );
                Ok(response)
            }),
        }
    }

    macro_rules! fake_service {
        ($name:ident, $service:literal) => {
            #[derive(Clone)]
            struct $name(Recorder);

            impl<B> Service<http::Request<B>> for $name
            where
                B: Body + Send + 'static,
                B::Error: Into<StdError> + Send + 'static,
            {
                type Response = http::Response<tonic::body::Body>;
                type Error = Infallible;
                type Future = BoxFuture<Self::Response, Self::Error>;

                fn poll_ready(
                    &mut self,
                    _cx: &mut Context<'_>,
                ) -> Poll<std::result::Result<(), Self::Error>> {
                    Poll::Ready(Ok(()))
                }

                fn call(&mut self, req: http::Request<B>) -> Self::Future {
                    route(&self.0, req)
                }
            }

            impl tonic::server::NamedService for $name {
                const NAME: &'static str = $service;
            }
        };
    }

    fake_service!(TenantApi, "api.TenantService");
    fake_service!(DeviceApi, "api.DeviceService");

    /// A TLS ChirpStack stand-in on a loopback port, and a client for it.
    async fn fake_chirpstack() -> (Recorder, GrpcChirpstack, JoinHandle<()>) {
        let (cert_pem, key_pem, _) = self_signed();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let seen = Recorder::default();
        let server = Server::builder()
            .tls_config(ServerTlsConfig::new().identity(Identity::from_pem(cert_pem, key_pem)))
            .unwrap()
            .add_service(TenantApi(Arc::clone(&seen)))
            .add_service(DeviceApi(Arc::clone(&seen)))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener));
        let handle = tokio::spawn(async move {
            let _ = server.await;
        });

        let channel = connect(&ConnectionSettings {
            host: "localhost".to_string(),
            port,
            api_key: "secret".to_string(),
        })
        .await
        .unwrap();
        (seen, GrpcChirpstack::new(channel), handle)
    }

    #[tokio::test]
    async fn test_list_reaches_server_with_bearer_key() {
        let (seen, client, handle) = fake_chirpstack().await;

        let tenants = client.list_tenants(&ListQuery::new(7, "ac")).await.unwrap();
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].name, "acme");

        let again = client.list_tenants(&ListQuery::default()).await.unwrap();
        assert_eq!(again[0].id, "t-1");

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.list_tenants,
            vec![(7, "ac".to_string()), (100, String::new())]
        );
        assert_eq!(seen.authorization, vec!["Bearer secret", "Bearer secret"]);
        handle.abort();
    }

    #[tokio::test]
    async fn test_failed_keys_read_fails_device_read() {
        let (seen, client, handle) = fake_chirpstack().await;

        let err = client.get_device("0102030405060708").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err
            .to_string()
            .starts_with("failed to get keys for device 0102030405060708"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.paths, vec![dev::GET, dev::GET_KEYS]);
        handle.abort();
    }

    #[tokio::test]
    async fn test_unknown_method_keeps_remote_code() {
        let (_, client, handle) = fake_chirpstack().await;

        let err = client.get_tenant("t-1").await.unwrap_err();
        assert_eq!(err.remote_code(), Some(tonic::Code::Unimplemented));
        assert!(err.to_string().starts_with("failed to get tenant t-1"));
        handle.abort();
    }
}
