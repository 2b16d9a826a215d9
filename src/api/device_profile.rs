//! `api.DeviceProfileService`.

use super::common::{MacVersion, RegParamsRevision, Region};

pub const CREATE: &str = "/api.DeviceProfileService/Create";
pub const GET: &str = "/api.DeviceProfileService/Get";
pub const UPDATE: &str = "/api.DeviceProfileService/Update";
pub const DELETE: &str = "/api.DeviceProfileService/Delete";
pub const LIST: &str = "/api.DeviceProfileService/List";

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeviceProfile {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub tenant_id: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(enumeration = "Region", tag = "4")]
    pub region: i32,
    #[prost(enumeration = "MacVersion", tag = "5")]
    pub mac_version: i32,
    #[prost(enumeration = "RegParamsRevision", tag = "6")]
    pub reg_params_revision: i32,
    #[prost(string, tag = "7")]
    pub adr_algorithm_id: String,
    #[prost(bool, tag = "10")]
    pub flush_queue_on_activate: bool,
    #[prost(uint32, tag = "11")]
    pub uplink_interval: u32,
    #[prost(uint32, tag = "12")]
    pub device_status_req_interval: u32,
    #[prost(bool, tag = "13")]
    pub supports_otaa: bool,
    #[prost(bool, tag = "14")]
    pub supports_class_b: bool,
    #[prost(bool, tag = "15")]
    pub supports_class_c: bool,
    #[prost(uint32, tag = "20")]
    pub class_c_timeout: u32,
    #[prost(string, tag = "26")]
    pub description: String,
    #[prost(string, tag = "29")]
    pub region_config_id: String,
    #[prost(bool, tag = "52")]
    pub allow_roaming: bool,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeviceProfileListItem {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(enumeration = "Region", tag = "5")]
    pub region: i32,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateDeviceProfileRequest {
    #[prost(message, optional, tag = "1")]
    pub device_profile: Option<DeviceProfile>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateDeviceProfileResponse {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetDeviceProfileRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetDeviceProfileResponse {
    #[prost(message, optional, tag = "1")]
    pub device_profile: Option<DeviceProfile>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UpdateDeviceProfileRequest {
    #[prost(message, optional, tag = "1")]
    pub device_profile: Option<DeviceProfile>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteDeviceProfileRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListDeviceProfilesRequest {
    #[prost(uint32, tag = "1")]
    pub limit: u32,
    #[prost(uint32, tag = "2")]
    pub offset: u32,
    #[prost(string, tag = "3")]
    pub search: String,
    #[prost(string, tag = "4")]
    pub tenant_id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListDeviceProfilesResponse {
    #[prost(uint32, tag = "1")]
    pub total_count: u32,
    #[prost(message, repeated, tag = "2")]
    pub result: Vec<DeviceProfileListItem>,
}
