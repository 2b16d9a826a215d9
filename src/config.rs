//! Provider configuration.
//!
//! The host passes the provider block as JSON. Every field is optional and
//! falls back to an environment variable:
//!
//! | Attribute | Environment variable |
//! |-----------|----------------------|
//! | `host`    | `CHIRPSTACK_HOST`    |
//! | `port`    | `CHIRPSTACK_PORT`    |
//! | `key`     | `CHIRPSTACK_KEY`     |

use serde::Deserialize;

use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Environment variable consulted when `host` is not configured.
pub const ENV_HOST: &str = "CHIRPSTACK_HOST";
/// Environment variable consulted when `port` is not configured.
pub const ENV_PORT: &str = "CHIRPSTACK_PORT";
/// Environment variable consulted when `key` is not configured.
pub const ENV_KEY: &str = "CHIRPSTACK_KEY";

/// The provider block as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// ChirpStack hostname.
    pub host: Option<String>,
    /// ChirpStack gRPC port.
    pub port: Option<i64>,
    /// ChirpStack API key.
    pub key: Option<String>,
}

/// Fully resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Hostname or IP address of the ChirpStack API.
    pub host: String,
    /// gRPC port of the ChirpStack API.
    pub port: u16,
    /// API key sent as a bearer token.
    pub api_key: String,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Decode the provider block. A `null` config is treated as empty.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Resolve against the process environment.
    pub fn resolve(&self) -> Result<ConnectionSettings, ProviderError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve using `lookup` for environment fallbacks.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ConnectionSettings, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = non_empty(self.host.clone())
            .or_else(|| non_empty(lookup(ENV_HOST)))
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "host is not set in the provider block or {}",
                    ENV_HOST
                ))
            })?;

        let port = match self.port.filter(|p| *p != 0) {
            Some(port) => u16::try_from(port).map_err(|_| {
                ProviderError::Configuration(format!("port {} is out of range", port))
            })?,
            None => {
                let raw = non_empty(lookup(ENV_PORT)).ok_or_else(|| {
                    ProviderError::Configuration(format!(
                        "port is not set in the provider block or {}",
                        ENV_PORT
                    ))
                })?;
                raw.trim().parse::<u16>().map_err(|e| {
                    ProviderError::Configuration(format!("{} is not a valid port: {}", ENV_PORT, e))
                })?
            },
        };

        let api_key = non_empty(self.key.clone())
            .or_else(|| non_empty(lookup(ENV_KEY)))
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "key is not set in the provider block or {}",
                    ENV_KEY
                ))
            })?;

        Ok(ConnectionSettings {
            host,
            port,
            api_key,
        })
    }

    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("ChirpStack network server connection")
            .with_attribute(
                "host",
                Attribute::optional_string().with_description("Chirpstack hostname"),
            )
            .with_attribute(
                "port",
                Attribute::optional_int64().with_description("Chirpstack port"),
            )
            .with_attribute(
                "key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Chirpstack api key"),
            )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
