//! Plan results, import results and handshake constants shared by the
//! provider and the gRPC glue.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generated;

/// A planned change to one top-level attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub path: String,
    /// `None` when the attribute is being set for the first time.
    pub before: Option<Value>,
    /// `None` when the attribute is being cleared.
    pub after: Option<Value>,
}

impl AttributeChange {
    /// A change between two possibly-null values. JSON `null` counts as absent.
    pub fn between(path: impl Into<String>, before: Option<&Value>, after: Option<&Value>) -> Self {
        let present = |v: Option<&Value>| v.filter(|v| !v.is_null()).cloned();
        Self {
            path: path.into(),
            before: present(before),
            after: present(after),
        }
    }
}

fn encode(value: Option<Value>) -> Vec<u8> {
    value
        .and_then(|v| serde_json::to_vec(&v).ok())
        .unwrap_or_default()
}

impl From<AttributeChange> for generated::AttributeChange {
    fn from(change: AttributeChange) -> Self {
        Self {
            path: change.path,
            before: encode(change.before),
            after: encode(change.after),
        }
    }
}

/// Outcome of planning one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub planned_state: Value,
    pub changes: Vec<AttributeChange>,
    /// The remote object must be deleted and created again.
    pub requires_replace: bool,
}

impl PlanResult {
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// Whether applying this plan would touch the remote object.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// State produced by importing an existing remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    pub resource_type: String,
    pub state: Value,
}

impl ImportedResource {
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

impl From<ImportedResource> for generated::ImportedResource {
    fn from(imported: ImportedResource) -> Self {
        Self {
            resource_type: imported.resource_type,
            state: encode(Some(imported.state)),
        }
    }
}

/// Names returned by `GetMetadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    pub resources: Vec<String>,
    pub data_sources: Vec<String>,
}

/// Protocol version printed in the handshake line.
pub const PROTOCOL_VERSION: u32 = 1;

/// First field of the handshake line.
pub const HANDSHAKE_PREFIX: &str = "HEMMER_PROVIDER";

/// The line printed to stdout once the server is listening.
pub fn handshake_line(addr: std::net::SocketAddr) -> String {
    format!("{}|{}|{}", HANDSHAKE_PREFIX, PROTOCOL_VERSION, addr)
}
