//! `api.MulticastGroupService`.

use super::common::Region;

pub const CREATE: &str = "/api.MulticastGroupService/Create";
pub const GET: &str = "/api.MulticastGroupService/Get";
pub const DELETE: &str = "/api.MulticastGroupService/Delete";
pub const LIST: &str = "/api.MulticastGroupService/List";
pub const ADD_GATEWAY: &str = "/api.MulticastGroupService/AddGateway";
pub const REMOVE_GATEWAY: &str = "/api.MulticastGroupService/RemoveGateway";
pub const ENQUEUE: &str = "/api.MulticastGroupService/Enqueue";

proto_enum! {
    pub enum MulticastGroupType {
        ClassC = 0 => "CLASS_C",
        ClassB = 1 => "CLASS_B",
    }
}

proto_enum! {
    /// Class-C downlink scheduling.
    pub enum MulticastGroupSchedulingType {
        Delay = 0 => "DELAY",
        GpsTime = 1 => "GPS_TIME",
    }
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MulticastGroup {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub application_id: String,
    #[prost(enumeration = "Region", tag = "4")]
    pub region: i32,
    #[prost(string, tag = "5")]
    pub mc_addr: String,
    #[prost(string, tag = "6")]
    pub mc_nwk_s_key: String,
    #[prost(string, tag = "7")]
    pub mc_app_s_key: String,
    #[prost(uint32, tag = "8")]
    pub f_cnt: u32,
    #[prost(enumeration = "MulticastGroupType", tag = "9")]
    pub group_type: i32,
    #[prost(uint32, tag = "10")]
    pub dr: u32,
    #[prost(uint32, tag = "11")]
    pub frequency: u32,
    #[prost(enumeration = "MulticastGroupSchedulingType", tag = "13")]
    pub class_c_scheduling_type: i32,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MulticastGroupListItem {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(enumeration = "Region", tag = "5")]
    pub region: i32,
    #[prost(enumeration = "MulticastGroupType", tag = "6")]
    pub group_type: i32,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateMulticastGroupRequest {
    #[prost(message, optional, tag = "1")]
    pub multicast_group: Option<MulticastGroup>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateMulticastGroupResponse {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetMulticastGroupRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetMulticastGroupResponse {
    #[prost(message, optional, tag = "1")]
    pub multicast_group: Option<MulticastGroup>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteMulticastGroupRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListMulticastGroupsRequest {
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
pub struct ListMulticastGroupsResponse {
    #[prost(uint32, tag = "1")]
    pub total_count: u32,
    #[prost(message, repeated, tag = "2")]
    pub result: Vec<MulticastGroupListItem>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct AddGatewayToMulticastGroupRequest {
    #[prost(string, tag = "1")]
    pub multicast_group_id: String,
    #[prost(string, tag = "2")]
    pub gateway_id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RemoveGatewayFromMulticastGroupRequest {
    #[prost(string, tag = "1")]
    pub multicast_group_id: String,
    #[prost(string, tag = "2")]
    pub gateway_id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MulticastGroupQueueItem {
    #[prost(string, tag = "1")]
    pub multicast_group_id: String,
    #[prost(uint32, tag = "2")]
    pub f_cnt: u32,
    #[prost(uint32, tag = "3")]
    pub f_port: u32,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct EnqueueMulticastGroupQueueItemRequest {
    #[prost(message, optional, tag = "1")]
    pub queue_item: Option<MulticastGroupQueueItem>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct EnqueueMulticastGroupQueueItemResponse {
    #[prost(uint32, tag = "1")]
    pub f_cnt: u32,
}
