//! Hemmer provider for ChirpStack
//!
//! Manages objects on a ChirpStack LoRaWAN network server through its gRPC
//! API: tenants, applications, HTTP integrations, device profiles, ABP
//! devices, gateways and class-C multicast groups, plus list data sources
//! for each kind.
//!
//! # Layers
//!
//! - [`api`]: ChirpStack API messages and the raw unary call helper
//! - [`client`]: connection bootstrap and the [`Chirpstack`](client::Chirpstack) façade
//! - [`resources`] and [`data_sources`]: mapping between Hemmer state and API objects
//! - [`provider`]: the [`ChirpstackProvider`] that ties them together
//! - [`server`]: the Hemmer provider protocol server and handshake
//!
//! # Handshake Protocol
//!
//! When the provider starts via [`serve`], it prints a handshake line to stdout:
//!
//! ```text
//! HEMMER_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `HEMMER_PROVIDER|<protocol_version>|<address>`
//!
//! # Configuration
//!
//! The provider block takes `host`, `port` and `key`. Each falls back to
//! `CHIRPSTACK_HOST`, `CHIRPSTACK_PORT` and `CHIRPSTACK_KEY` respectively.

#![warn(clippy::all)]

pub mod api;
pub mod client;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod server;
pub mod testing;
pub mod types;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

// Re-export main types at crate root
pub use client::{Chirpstack, GrpcChirpstack};
pub use config::{ConnectionSettings, ProviderConfig};
pub use data_sources::ListDataSource;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::ChirpstackProvider;
pub use schema::ProviderSchema;
pub use server::{serve, serve_listener, serve_with_options, ProviderService, ServeOptions};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, HANDSHAKE_PREFIX,
    PROTOCOL_VERSION,
};

pub use async_trait::async_trait;
pub use serde_json;
pub use tonic;
