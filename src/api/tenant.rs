//! `api.TenantService`.

pub const CREATE: &str = "/api.TenantService/Create";
pub const GET: &str = "/api.TenantService/Get";
pub const UPDATE: &str = "/api.TenantService/Update";
pub const DELETE: &str = "/api.TenantService/Delete";
pub const LIST: &str = "/api.TenantService/List";

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Tenant {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct TenantListItem {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "4")]
    pub name: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateTenantRequest {
    #[prost(message, optional, tag = "1")]
    pub tenant: Option<Tenant>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateTenantResponse {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetTenantRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetTenantResponse {
    #[prost(message, optional, tag = "1")]
    pub tenant: Option<Tenant>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UpdateTenantRequest {
    #[prost(message, optional, tag = "1")]
    pub tenant: Option<Tenant>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteTenantRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListTenantsRequest {
    #[prost(uint32, tag = "1")]
    pub limit: u32,
    #[prost(uint32, tag = "2")]
    pub offset: u32,
    #[prost(string, tag = "3")]
    pub search: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListTenantsResponse {
    #[prost(uint32, tag = "1")]
    pub total_count: u32,
    #[prost(message, repeated, tag = "2")]
    pub result: Vec<TenantListItem>,
}
