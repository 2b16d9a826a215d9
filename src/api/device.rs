//! `api.DeviceService`.

use super::common::DeviceClass;

pub const CREATE: &str = "/api.DeviceService/Create";
pub const GET: &str = "/api.DeviceService/Get";
pub const UPDATE: &str = "/api.DeviceService/Update";
pub const DELETE: &str = "/api.DeviceService/Delete";
pub const LIST: &str = "/api.DeviceService/List";
pub const CREATE_KEYS: &str = "/api.DeviceService/CreateKeys";
pub const GET_KEYS: &str = "/api.DeviceService/GetKeys";
pub const ACTIVATE: &str = "/api.DeviceService/Activate";
pub const GET_ACTIVATION: &str = "/api.DeviceService/GetActivation";
pub const ENQUEUE: &str = "/api.DeviceService/Enqueue";

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Device {
    #[prost(string, tag = "1")]
    pub dev_eui: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub application_id: String,
    #[prost(string, tag = "5")]
    pub device_profile_id: String,
    #[prost(string, tag = "10")]
    pub join_eui: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct DeviceStatus {
    #[prost(int32, tag = "1")]
    pub margin: i32,
    #[prost(bool, tag = "2")]
    pub external_power_source: bool,
    #[prost(float, tag = "3")]
    pub battery_level: f32,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeviceKeys {
    #[prost(string, tag = "1")]
    pub dev_eui: String,
    #[prost(string, tag = "2")]
    pub nwk_key: String,
    #[prost(string, tag = "3")]
    pub app_key: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeviceActivation {
    #[prost(string, tag = "1")]
    pub dev_eui: String,
    #[prost(string, tag = "2")]
    pub dev_addr: String,
    #[prost(string, tag = "3")]
    pub app_s_key: String,
    #[prost(string, tag = "4")]
    pub nwk_s_enc_key: String,
    #[prost(uint32, tag = "5")]
    pub f_cnt_up: u32,
    #[prost(uint32, tag = "6")]
    pub n_f_cnt_down: u32,
    #[prost(string, tag = "8")]
    pub s_nwk_s_int_key: String,
    #[prost(string, tag = "9")]
    pub f_nwk_s_int_key: String,
    #[prost(uint32, tag = "10")]
    pub a_f_cnt_down: u32,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeviceListItem {
    #[prost(string, tag = "1")]
    pub dev_eui: String,
    #[prost(string, tag = "5")]
    pub name: String,
    #[prost(string, tag = "6")]
    pub description: String,
    #[prost(string, tag = "7")]
    pub device_profile_id: String,
    #[prost(string, tag = "8")]
    pub device_profile_name: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateDeviceRequest {
    #[prost(message, optional, tag = "1")]
    pub device: Option<Device>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetDeviceRequest {
    #[prost(string, tag = "1")]
    pub dev_eui: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetDeviceResponse {
    #[prost(message, optional, tag = "1")]
    pub device: Option<Device>,
    #[prost(message, optional, tag = "5")]
    pub device_status: Option<DeviceStatus>,
    #[prost(enumeration = "DeviceClass", tag = "6")]
    pub class_enabled: i32,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UpdateDeviceRequest {
    #[prost(message, optional, tag = "1")]
    pub device: Option<Device>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteDeviceRequest {
    #[prost(string, tag = "1")]
    pub dev_eui: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListDevicesRequest {
    #[prost(uint32, tag = "1")]
    pub limit: u32,
    #[prost(uint32, tag = "2")]
    pub offset: u32,
    #[prost(string, tag = "3")]
    pub search: String,
    #[prost(string, tag = "4")]
    pub application_id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListDevicesResponse {
    #[prost(uint32, tag = "1")]
    pub total_count: u32,
    #[prost(message, repeated, tag = "2")]
    pub result: Vec<DeviceListItem>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateDeviceKeysRequest {
    #[prost(message, optional, tag = "1")]
    pub device_keys: Option<DeviceKeys>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetDeviceKeysRequest {
    #[prost(string, tag = "1")]
    pub dev_eui: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetDeviceKeysResponse {
    #[prost(message, optional, tag = "1")]
    pub device_keys: Option<DeviceKeys>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ActivateDeviceRequest {
    #[prost(message, optional, tag = "1")]
    pub device_activation: Option<DeviceActivation>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetDeviceActivationRequest {
    #[prost(string, tag = "1")]
    pub dev_eui: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetDeviceActivationResponse {
    #[prost(message, optional, tag = "1")]
    pub device_activation: Option<DeviceActivation>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeviceQueueItem {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub dev_eui: String,
    #[prost(bool, tag = "3")]
    pub confirmed: bool,
    #[prost(uint32, tag = "4")]
    pub f_port: u32,
    #[prost(bytes = "vec", tag = "5")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct EnqueueDeviceQueueItemRequest {
    #[prost(message, optional, tag = "1")]
    pub queue_item: Option<DeviceQueueItem>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct EnqueueDeviceQueueItemResponse {
    #[prost(string, tag = "1")]
    pub id: String,
}
