//! Error types for the ChirpStack provider.

use thiserror::Error;

/// Errors that can occur while configuring the provider or managing resources.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The ChirpStack endpoint could not be reached: TCP connect, TLS handshake,
    /// certificate harvest or the bounded dial failed.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// A remote RPC returned a failure. The status is kept as received.
    #[error("failed to {operation} {key}: {status}")]
    RemoteOperation {
        /// Static description of the call, e.g. `get tenant`.
        operation: &'static str,
        /// Identifier the call was keyed on.
        key: String,
        /// Status returned by the remote server or transport.
        status: tonic::Status,
    },

    /// The provider configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A resource or data source call arrived before `Configure`.
    #[error("Provider is not configured: call Configure before managing resources")]
    NotConfigured,

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// Resource state could not be decoded into the resource model.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The plugin server could not open or inspect its own listener.
    #[error("Serve error: {0}")]
    Serve(String),

    /// A gRPC transport error occurred while serving the plugin protocol.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl ProviderError {
    /// Wrap a failed RPC with the operation name and key it was issued for.
    pub fn remote(operation: &'static str, key: impl Into<String>, status: tonic::Status) -> Self {
        Self::RemoteOperation {
            operation,
            key: key.into(),
            status,
        }
    }

    /// The status code of a failed remote call, if this is one.
    pub fn remote_code(&self) -> Option<tonic::Code> {
        match self {
            Self::RemoteOperation { status, .. } => Some(status.code()),
            _ => None,
        }
    }

    /// Whether this is a remote `NOT_FOUND`.
    pub fn is_not_found(&self) -> bool {
        self.remote_code() == Some(tonic::Code::NotFound)
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Connectivity(msg) => tonic::Status::unavailable(msg),
            ProviderError::RemoteOperation {
                operation,
                key,
                status,
            } => tonic::Status::new(
                status.code(),
                format!("failed to {} {}: {}", operation, key, status.message()),
            ),
            ProviderError::Configuration(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::NotConfigured => {
                tonic::Status::failed_precondition("provider is not configured")
            },
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
            ProviderError::Serve(msg) => tonic::Status::internal(msg),
            ProviderError::Transport(err) => {
                tonic::Status::unavailable(format!("Transport error: {}", err))
            },
        }
    }
}
