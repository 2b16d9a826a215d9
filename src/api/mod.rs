//! ChirpStack v4 administrative API messages.
//!
//! These are hand-maintained prost types covering the subset of the upstream
//! `api` and `common` packages the provider uses. Field numbers follow the
//! upstream `.proto` files so the wire encoding is compatible; fields the
//! provider never reads or writes are left out and are skipped by the decoder.

use tonic::codegen::{http::uri::PathAndQuery, Body, Bytes, StdError};
use tonic::{client::Grpc, Request, Status};

/// Declares a protobuf enum with its upstream field names.
macro_rules! proto_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $value:literal => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum $name {
            $($variant = $value,)+
        }

        impl $name {
            /// Upstream protobuf name of the variant.
            pub fn as_str_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Look up a variant by its upstream protobuf name.
            pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

pub mod application;
pub mod common;
pub mod device;
pub mod device_profile;
pub mod gateway;
pub mod multicast_group;
pub mod tenant;

/// `google.protobuf.Empty`.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Empty {}

/// Issue one unary call on `path` and return the decoded response body.
pub async fn unary<T, Req, Resp>(
    inner: &mut Grpc<T>,
    path: &'static str,
    request: Req,
) -> Result<Resp, Status>
where
    T: tonic::client::GrpcService<tonic::body::Body>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    Req: ::prost::Message + Send + Sync + 'static,
    Resp: ::prost::Message + Default + Send + Sync + 'static,
{
    inner.ready().await.map_err(|e| {
        let err: StdError = e.into();
        Status::unknown(format!("Service was not ready: {}", err))
    })?;
    let codec = tonic_prost::ProstCodec::default();
    let response = inner
        .unary(Request::new(request), PathAndQuery::from_static(path), codec)
        .await?;
    Ok(response.into_inner())
}

#[cfg(test)]
mod tests {
    use super::common::{MacVersion, Region, RegParamsRevision};
    use super::tenant::Tenant;
    use prost::Message;

    #[test]
    fn test_enum_names_follow_upstream() {
        assert_eq!(Region::from_str_name("EU868"), Some(Region::Eu868));
        assert_eq!(Region::As9232.as_str_name(), "AS923_2");
        assert_eq!(Region::Us915 as i32, 2);
        assert_eq!(
            MacVersion::from_str_name("LORAWAN_1_0_3"),
            Some(MacVersion::Lorawan103)
        );
        assert_eq!(RegParamsRevision::Rp002103.as_str_name(), "RP002_1_0_3");
        assert_eq!(Region::from_str_name("MARS"), None);
    }

    #[test]
    fn test_tenant_wire_layout() {
        let tenant = Tenant {
            id: String::new(),
            name: "acme".to_string(),
            description: "d".to_string(),
        };
        // field 2 (name), length-delimited, then field 3 (description)
        assert_eq!(tenant.encode_to_vec(), b"\x12\x04acme\x1a\x01d");
    }
}
