//! `api.ApplicationService`, including the HTTP integration calls.

use std::collections::HashMap;

pub const CREATE: &str = "/api.ApplicationService/Create";
pub const GET: &str = "/api.ApplicationService/Get";
pub const UPDATE: &str = "/api.ApplicationService/Update";
pub const DELETE: &str = "/api.ApplicationService/Delete";
pub const LIST: &str = "/api.ApplicationService/List";
pub const CREATE_HTTP_INTEGRATION: &str = "/api.ApplicationService/CreateHttpIntegration";
pub const GET_HTTP_INTEGRATION: &str = "/api.ApplicationService/GetHttpIntegration";
pub const UPDATE_HTTP_INTEGRATION: &str = "/api.ApplicationService/UpdateHttpIntegration";
pub const DELETE_HTTP_INTEGRATION: &str = "/api.ApplicationService/DeleteHttpIntegration";

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Application {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub tenant_id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ApplicationListItem {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(string, tag = "5")]
    pub description: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateApplicationRequest {
    #[prost(message, optional, tag = "1")]
    pub application: Option<Application>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateApplicationResponse {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetApplicationRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetApplicationResponse {
    #[prost(message, optional, tag = "1")]
    pub application: Option<Application>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UpdateApplicationRequest {
    #[prost(message, optional, tag = "1")]
    pub application: Option<Application>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteApplicationRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListApplicationsRequest {
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
pub struct ListApplicationsResponse {
    #[prost(uint32, tag = "1")]
    pub total_count: u32,
    #[prost(message, repeated, tag = "2")]
    pub result: Vec<ApplicationListItem>,
}

proto_enum! {
    /// Payload encoding used by integrations.
    pub enum Encoding {
        Json = 0 => "JSON",
        Protobuf = 1 => "PROTOBUF",
    }
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct HttpIntegration {
    #[prost(string, tag = "1")]
    pub application_id: String,
    #[prost(map = "string, string", tag = "2")]
    pub headers: HashMap<String, String>,
    #[prost(enumeration = "Encoding", tag = "3")]
    pub encoding: i32,
    #[prost(string, tag = "4")]
    pub event_endpoint_url: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateHttpIntegrationRequest {
    #[prost(message, optional, tag = "1")]
    pub integration: Option<HttpIntegration>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetHttpIntegrationRequest {
    #[prost(string, tag = "1")]
    pub application_id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetHttpIntegrationResponse {
    #[prost(message, optional, tag = "1")]
    pub integration: Option<HttpIntegration>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UpdateHttpIntegrationRequest {
    #[prost(message, optional, tag = "1")]
    pub integration: Option<HttpIntegration>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteHttpIntegrationRequest {
    #[prost(string, tag = "1")]
    pub application_id: String,
}
