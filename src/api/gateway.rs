//! `api.GatewayService`.

use super::common::Location;

pub const CREATE: &str = "/api.GatewayService/Create";
pub const GET: &str = "/api.GatewayService/Get";
pub const UPDATE: &str = "/api.GatewayService/Update";
pub const DELETE: &str = "/api.GatewayService/Delete";
pub const LIST: &str = "/api.GatewayService/List";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Gateway {
    #[prost(string, tag = "1")]
    pub gateway_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(message, optional, tag = "4")]
    pub location: Option<Location>,
    #[prost(string, tag = "5")]
    pub tenant_id: String,
    #[prost(uint32, tag = "8")]
    pub stats_interval: u32,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GatewayListItem {
    #[prost(string, tag = "1")]
    pub tenant_id: String,
    #[prost(string, tag = "2")]
    pub gateway_id: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(string, tag = "4")]
    pub description: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateGatewayRequest {
    #[prost(message, optional, tag = "1")]
    pub gateway: Option<Gateway>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetGatewayRequest {
    #[prost(string, tag = "1")]
    pub gateway_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGatewayResponse {
    #[prost(message, optional, tag = "1")]
    pub gateway: Option<Gateway>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateGatewayRequest {
    #[prost(message, optional, tag = "1")]
    pub gateway: Option<Gateway>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteGatewayRequest {
    #[prost(string, tag = "1")]
    pub gateway_id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListGatewaysRequest {
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
pub struct ListGatewaysResponse {
    #[prost(uint32, tag = "1")]
    pub total_count: u32,
    #[prost(message, repeated, tag = "2")]
    pub result: Vec<GatewayListItem>,
}
