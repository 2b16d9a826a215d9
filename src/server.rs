//! Plugin protocol server.
//!
//! [`ProviderService`] is the JSON-level interface a provider implements.
//! [`ProviderGrpcService`] adapts it to the generated `hemmer.provider.v1`
//! service, and [`serve`] runs it behind the stdout handshake.
//!
//! Failures never surface as gRPC errors to the host. Each one is logged and
//! returned as an error diagnostic whose summary is the error's display text.
//!
//! # Signal Handling
//!
//! SIGTERM and SIGINT stop the listener. In-flight calls get
//! [`ServeOptions::shutdown_timeout`] to finish, then the provider's `stop()`
//! runs.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tonic::transport::Server;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProviderError;
use crate::generated::{self, provider_server::ProviderServer};
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema, Schema};
use crate::types::{handshake_line, ImportedResource, PlanResult, ProviderMetadata};

/// JSON-level provider interface.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// Every schema the provider serves.
    fn schema(&self) -> ProviderSchema;

    /// Resource and data source names, derived from [`schema`](Self::schema).
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.into_keys().collect();
        let mut data_sources: Vec<String> = schema.data_sources.into_keys().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
        }
    }

    /// Apply the provider block. Returned diagnostics are passed through.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    async fn create(&self, resource_type: &str, planned_state: Value)
        -> Result<Value, ProviderError>;

    async fn read(&self, resource_type: &str, current_state: Value)
        -> Result<Value, ProviderError>;

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    async fn delete(&self, resource_type: &str, current_state: Value)
        -> Result<(), ProviderError>;

    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::UnknownResource(format!(
            "{} cannot be imported",
            resource_type
        )))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        _config: Value,
    ) -> Result<Value, ProviderError> {
        Err(ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

/// Adapts a [`ProviderService`] to the generated gRPC trait.
pub struct ProviderGrpcService<P: ProviderService> {
    provider: Arc<P>,
}

impl<P: ProviderService> ProviderGrpcService<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<generated::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|d| generated::Diagnostic {
            severity: match d.severity {
                DiagnosticSeverity::Error => generated::diagnostic::Severity::Error as i32,
                DiagnosticSeverity::Warning => generated::diagnostic::Severity::Warning as i32,
            },
            summary: d.summary,
            detail: d.detail.unwrap_or_default(),
            attribute: d.attribute.unwrap_or_default(),
        })
        .collect()
}

fn error_to_diagnostics(err: ProviderError) -> Vec<generated::Diagnostic> {
    let mut diagnostic = Diagnostic::error(err.to_string());
    if let Some(code) = err.remote_code() {
        diagnostic = diagnostic.with_detail(format!("remote status: {:?}", code));
    }
    diagnostics_to_proto(vec![diagnostic])
}

fn schema_to_proto(schema: &Schema) -> generated::Schema {
    let mut attributes: Vec<generated::Attribute> = schema
        .attributes
        .iter()
        .map(|(name, attr)| generated::Attribute {
            name: name.clone(),
            r#type: serde_json::to_vec(&attr.attr_type).unwrap_or_default(),
            required: attr.flags.required,
            optional: attr.flags.optional,
            computed: attr.flags.computed,
            sensitive: attr.flags.sensitive,
            description: attr.description.clone().unwrap_or_default(),
            force_new: attr.force_new,
            default_value: attr
                .default
                .as_ref()
                .and_then(|v| serde_json::to_vec(v).ok())
                .unwrap_or_default(),
        })
        .collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));

    generated::Schema {
        version: schema.version as i64,
        attributes,
        description: schema.description.clone().unwrap_or_default(),
    }
}

/// Empty bytes read as `null`. Anything else must be valid JSON.
fn decode(bytes: &[u8]) -> Result<Value, ProviderError> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

fn encode(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

/// Log the outcome of a lifecycle call and fold an error into diagnostics.
fn settle<T>(
    call: &'static str,
    resource_type: &str,
    result: Result<T, ProviderError>,
) -> (Option<T>, Vec<generated::Diagnostic>) {
    match result {
        Ok(value) => {
            info!(resource_type = %resource_type, "{} completed", call);
            (Some(value), Vec::new())
        },
        Err(e) => {
            error!(resource_type = %resource_type, error = %e, "{} failed", call);
            (None, error_to_diagnostics(e))
        },
    }
}

type GrpcResult<T> = Result<tonic::Response<T>, tonic::Status>;

#[tonic::async_trait]
impl<P: ProviderService> generated::provider_server::Provider for ProviderGrpcService<P> {
    #[instrument(skip(self, _request), name = "grpc.get_metadata")]
    async fn get_metadata(
        &self,
        _request: tonic::Request<generated::GetMetadataRequest>,
    ) -> GrpcResult<generated::GetMetadataResponse> {
        let metadata = self.provider.metadata();
        debug!(
            resources = metadata.resources.len(),
            data_sources = metadata.data_sources.len(),
            "GetMetadata completed"
        );
        Ok(tonic::Response::new(generated::GetMetadataResponse {
            server_capabilities: Some(generated::ServerCapabilities {
                plan_destroy: false,
            }),
            resources: metadata.resources,
            data_sources: metadata.data_sources,
            diagnostics: vec![],
        }))
    }

    #[instrument(skip(self, _request), name = "grpc.get_schema")]
    async fn get_schema(
        &self,
        _request: tonic::Request<generated::GetSchemaRequest>,
    ) -> GrpcResult<generated::GetSchemaResponse> {
        let schema = self.provider.schema();
        debug!(
            resources = schema.resources.len(),
            data_sources = schema.data_sources.len(),
            "GetSchema completed"
        );
        Ok(tonic::Response::new(generated::GetSchemaResponse {
            provider: Some(schema_to_proto(&schema.provider)),
            resources: schema
                .resources
                .iter()
                .map(|(k, v)| (k.clone(), schema_to_proto(v)))
                .collect(),
            data_sources: schema
                .data_sources
                .iter()
                .map(|(k, v)| (k.clone(), schema_to_proto(v)))
                .collect(),
            diagnostics: vec![],
        }))
    }

    #[instrument(skip(self, request), name = "grpc.configure")]
    async fn configure(
        &self,
        request: tonic::Request<generated::ConfigureRequest>,
    ) -> GrpcResult<generated::ConfigureResponse> {
        let result = match decode(&request.into_inner().config) {
            Ok(config) => self.provider.configure(config).await,
            Err(e) => Err(e),
        };
        let diagnostics = match result {
            Ok(diagnostics) => {
                if diagnostics
                    .iter()
                    .any(|d| d.severity == DiagnosticSeverity::Error)
                {
                    warn!(diagnostics = diagnostics.len(), "Configure completed with errors");
                } else {
                    info!("Configure completed");
                }
                diagnostics_to_proto(diagnostics)
            },
            Err(e) => {
                error!(error = %e, "Configure failed");
                error_to_diagnostics(e)
            },
        };
        Ok(tonic::Response::new(generated::ConfigureResponse {
            diagnostics,
        }))
    }

    #[instrument(skip(self, _request), name = "grpc.stop")]
    async fn stop(
        &self,
        _request: tonic::Request<generated::StopRequest>,
    ) -> GrpcResult<generated::StopResponse> {
        let error = match self.provider.stop().await {
            Ok(()) => String::new(),
            Err(e) => {
                error!(error = %e, "Stop failed");
                e.to_string()
            },
        };
        Ok(tonic::Response::new(generated::StopResponse { error }))
    }

    #[instrument(skip(self, request), name = "grpc.plan", fields(resource_type))]
    async fn plan(
        &self,
        request: tonic::Request<generated::PlanRequest>,
    ) -> GrpcResult<generated::PlanResponse> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result: Result<PlanResult, ProviderError> = async {
            let prior = Some(decode(&req.prior_state)?).filter(|v| !v.is_null());
            self.provider
                .plan(
                    &req.resource_type,
                    prior,
                    decode(&req.proposed_state)?,
                    decode(&req.config)?,
                )
                .await
        }
        .await;

        let (plan, diagnostics) = settle("Plan", &req.resource_type, result);
        let response = match plan {
            Some(plan) => generated::PlanResponse {
                planned_state: encode(&plan.planned_state),
                changes: plan.changes.into_iter().map(Into::into).collect(),
                requires_replace: plan.requires_replace,
                diagnostics,
            },
            None => generated::PlanResponse {
                diagnostics,
                ..Default::default()
            },
        };
        Ok(tonic::Response::new(response))
    }

    #[instrument(skip(self, request), name = "grpc.create", fields(resource_type))]
    async fn create(
        &self,
        request: tonic::Request<generated::CreateRequest>,
    ) -> GrpcResult<generated::CreateResponse> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result: Result<Value, ProviderError> = async {
            let planned = decode(&req.planned_state)?;
            self.provider.create(&req.resource_type, planned).await
        }
        .await;

        let (state, diagnostics) = settle("Create", &req.resource_type, result);
        Ok(tonic::Response::new(generated::CreateResponse {
            state: state.as_ref().map(encode).unwrap_or_default(),
            diagnostics,
        }))
    }

    #[instrument(skip(self, request), name = "grpc.read", fields(resource_type))]
    async fn read(
        &self,
        request: tonic::Request<generated::ReadRequest>,
    ) -> GrpcResult<generated::ReadResponse> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result: Result<Value, ProviderError> = async {
            let current = decode(&req.current_state)?;
            self.provider.read(&req.resource_type, current).await
        }
        .await;

        let (state, diagnostics) = settle("Read", &req.resource_type, result);
        Ok(tonic::Response::new(generated::ReadResponse {
            state: state.as_ref().map(encode).unwrap_or_default(),
            diagnostics,
        }))
    }

    #[instrument(skip(self, request), name = "grpc.update", fields(resource_type))]
    async fn update(
        &self,
        request: tonic::Request<generated::UpdateRequest>,
    ) -> GrpcResult<generated::UpdateResponse> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result: Result<Value, ProviderError> = async {
            let prior = decode(&req.prior_state)?;
            let planned = decode(&req.planned_state)?;
            self.provider
                .update(&req.resource_type, prior, planned)
                .await
        }
        .await;

        let (state, diagnostics) = settle("Update", &req.resource_type, result);
        Ok(tonic::Response::new(generated::UpdateResponse {
            state: state.as_ref().map(encode).unwrap_or_default(),
            diagnostics,
        }))
    }

    #[instrument(skip(self, request), name = "grpc.delete", fields(resource_type))]
    async fn delete(
        &self,
        request: tonic::Request<generated::DeleteRequest>,
    ) -> GrpcResult<generated::DeleteResponse> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result: Result<(), ProviderError> = async {
            let current = decode(&req.current_state)?;
            self.provider.delete(&req.resource_type, current).await
        }
        .await;

        let (_, diagnostics) = settle("Delete", &req.resource_type, result);
        Ok(tonic::Response::new(generated::DeleteResponse { diagnostics }))
    }

    #[instrument(skip(self, request), name = "grpc.import_resource_state", fields(resource_type))]
    async fn import_resource_state(
        &self,
        request: tonic::Request<generated::ImportResourceStateRequest>,
    ) -> GrpcResult<generated::ImportResourceStateResponse> {
        let req = request.into_inner();
        tracing::Span::current().record("resource_type", req.resource_type.as_str());
        let result = self
            .provider
            .import_resource(&req.resource_type, &req.id)
            .await;

        let (imported, diagnostics) = settle("ImportResourceState", &req.resource_type, result);
        Ok(tonic::Response::new(
            generated::ImportResourceStateResponse {
                imported: imported
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                diagnostics,
            },
        ))
    }

    #[instrument(skip(self, request), name = "grpc.read_data_source", fields(data_source_type))]
    async fn read_data_source(
        &self,
        request: tonic::Request<generated::ReadDataSourceRequest>,
    ) -> GrpcResult<generated::ReadDataSourceResponse> {
        let req = request.into_inner();
        tracing::Span::current().record("data_source_type", req.data_source_type.as_str());
        let result: Result<Value, ProviderError> = async {
            let config = decode(&req.config)?;
            self.provider
                .read_data_source(&req.data_source_type, config)
                .await
        }
        .await;

        let (state, diagnostics) = settle("ReadDataSource", &req.data_source_type, result);
        Ok(tonic::Response::new(generated::ReadDataSourceResponse {
            state: state.as_ref().map(encode).unwrap_or_default(),
            diagnostics,
        }))
    }
}

/// Options for [`serve_with_options`].
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// How long in-flight calls may run after a shutdown signal.
    /// Default: 30 seconds.
    pub shutdown_timeout: Duration,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServeOptions {
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// Resolves on SIGTERM or SIGINT (CTRL+C elsewhere).
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                    _ = sigint.recv() => info!("Received SIGINT, shutting down"),
                }
            },
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Cannot install signal handlers, falling back to CTRL+C");
                let _ = tokio::signal::ctrl_c().await;
            },
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for CTRL+C");
            std::future::pending::<()>().await;
        }
        info!("Received CTRL+C, shutting down");
    }
}

/// Serve `provider` on an ephemeral loopback port.
///
/// Prints `HEMMER_PROVIDER|<version>|<address>` to stdout once listening and
/// runs until SIGTERM or SIGINT.
pub async fn serve<P: ProviderService>(provider: P) -> Result<(), ProviderError> {
    serve_with_options(provider, ServeOptions::default()).await
}

/// [`serve`] with custom options.
pub async fn serve_with_options<P: ProviderService>(
    provider: P,
    options: ServeOptions,
) -> Result<(), ProviderError> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| ProviderError::Serve(format!("cannot bind listener: {}", e)))?;
    serve_listener(provider, listener, options, wait_for_shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve_listener<P, F>(
    provider: P,
    listener: TcpListener,
    options: ServeOptions,
    shutdown: F,
) -> Result<(), ProviderError>
where
    P: ProviderService,
    F: Future<Output = ()>,
{
    let addr: SocketAddr = listener
        .local_addr()
        .map_err(|e| ProviderError::Serve(format!("listener has no address: {}", e)))?;

    println!("{}", handshake_line(addr));
    info!(address = %addr, "Provider server starting");

    let provider = Arc::new(provider);
    let service = ProviderServer::new(ProviderGrpcService::new(Arc::clone(&provider)));

    let draining = Arc::new(Notify::new());
    let drain_signal = Arc::clone(&draining);
    let server = Server::builder()
        .add_service(service)
        .serve_with_incoming_shutdown(
            tokio_stream::wrappers::TcpListenerStream::new(listener),
            async move { drain_signal.notified().await },
        );
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown => {
            draining.notify_one();
            match tokio::time::timeout(options.shutdown_timeout, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    timeout = ?options.shutdown_timeout,
                    "Shutdown timeout exceeded, dropping in-flight calls"
                ),
            }
        },
    }
    info!("Server shutdown complete");

    if let Err(e) = provider.stop().await {
        warn!(error = %e, "Provider stop() returned error");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::schema::Attribute;
    use crate::types::AttributeChange;
    use serde_json::json;
    use tokio::sync::oneshot;
    use tonic::client::Grpc;
    use tonic::transport::{Channel, Identity, ServerTlsConfig};

    /// Records configure calls and fails every create.
    #[derive(Default)]
    struct StubProvider {
        configured: std::sync::Mutex<Option<Value>>,
    }

    #[async_trait::async_trait]
    impl ProviderService for StubProvider {
        fn schema(&self) -> ProviderSchema {
            ProviderSchema::new()
                .with_resource(
                    "stub_thing",
                    Schema::v0()
                        .with_id("Thing id")
                        .with_attribute("name", Attribute::required_string()),
                )
                .with_data_source("stub_things", Schema::v0())
        }

        async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
            *self.configured.lock().unwrap() = Some(config);
            Ok(vec![Diagnostic::warning("using defaults")])
        }

        async fn plan(
            &self,
            _resource_type: &str,
            prior_state: Option<Value>,
            proposed_state: Value,
            _config: Value,
        ) -> Result<PlanResult, ProviderError> {
            Ok(PlanResult {
                changes: vec![AttributeChange::between(
                    "name",
                    prior_state.as_ref().and_then(|p| p.get("name")),
                    proposed_state.get("name"),
                )],
                planned_state: proposed_state,
                requires_replace: prior_state.is_none(),
            })
        }

        async fn create(&self, resource_type: &str, _: Value) -> Result<Value, ProviderError> {
            Err(ProviderError::remote(
                "create thing",
                resource_type,
                tonic::Status::already_exists("taken"),
            ))
        }

        async fn read(&self, _: &str, current_state: Value) -> Result<Value, ProviderError> {
            Ok(current_state)
        }

        async fn update(&self, _: &str, _: Value, planned: Value) -> Result<Value, ProviderError> {
            Ok(planned)
        }

        async fn delete(&self, _: &str, _: Value) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn service() -> (Arc<StubProvider>, ProviderGrpcService<StubProvider>) {
        let provider = Arc::new(StubProvider::default());
        (provider.clone(), ProviderGrpcService::new(provider))
    }

    #[test]
    fn test_schema_to_proto_is_sorted_and_typed() {
        let schema = Schema::v0()
            .with_description("Tenant")
            .with_attribute("name", Attribute::required_string())
            .with_id("Tenant id");
        let proto = schema_to_proto(&schema);
        let names: Vec<&str> = proto.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(proto.attributes[1].r#type, b"\"string\"");
        assert!(proto.attributes[0].computed);
        assert_eq!(proto.description, "Tenant");
    }

    #[test]
    fn test_error_becomes_single_error_diagnostic() {
        let diags = error_to_diagnostics(ProviderError::NotConfigured);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].severity,
            generated::diagnostic::Severity::Error as i32
        );
        assert!(diags[0].summary.contains("not configured"));
        assert!(diags[0].detail.is_empty());

        let diags = error_to_diagnostics(ProviderError::remote(
            "get tenant",
            "t-1",
            tonic::Status::not_found("object does not exist"),
        ));
        assert!(diags[0].summary.starts_with("failed to get tenant t-1"));
        assert_eq!(diags[0].detail, "remote status: NotFound");
    }

    #[test]
    fn test_decode_accepts_empty_and_rejects_garbage() {
        assert_eq!(decode(b"").unwrap(), Value::Null);
        assert!(matches!(
            decode(b"{not json"),
            Err(ProviderError::Serialization(_))
        ));
        assert_eq!(decode(br#"{"a":1}"#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_metadata_is_sorted() {
        let (provider, _) = service();
        let metadata = provider.metadata();
        assert_eq!(metadata.resources, vec!["stub_thing"]);
        assert_eq!(metadata.data_sources, vec!["stub_things"]);
    }

    #[tokio::test]
    async fn test_configure_passes_config_and_diagnostics() {
        use generated::provider_server::Provider;
        let (provider, grpc) = service();
        let response = grpc
            .configure(tonic::Request::new(generated::ConfigureRequest {
                config: br#"{"host":"h"}"#.to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(
            provider.configured.lock().unwrap().clone(),
            Some(json!({"host": "h"}))
        );
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].severity,
            generated::diagnostic::Severity::Warning as i32
        );
    }

    #[tokio::test]
    async fn test_undecodable_state_is_reported() {
        use generated::provider_server::Provider;
        let (_, grpc) = service();
        let response = grpc
            .plan(tonic::Request::new(generated::PlanRequest {
                resource_type: "stub_thing".to_string(),
                prior_state: br#"{"id":"x","name":"acme"}"#.to_vec(),
                proposed_state: br#"{"name":"#.to_vec(),
                config: vec![],
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.planned_state.is_empty());
        assert!(response.changes.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0]
            .summary
            .starts_with("Serialization error"));

        let response = grpc
            .update(tonic::Request::new(generated::UpdateRequest {
                resource_type: "stub_thing".to_string(),
                prior_state: br#"{"id":"x"}"#.to_vec(),
                planned_state: b"not json".to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.state.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn test_plan_without_prior_state() {
        use generated::provider_server::Provider;
        let (_, grpc) = service();
        let response = grpc
            .plan(tonic::Request::new(generated::PlanRequest {
                resource_type: "stub_thing".to_string(),
                prior_state: vec![],
                proposed_state: br#"{"name":"acme"}"#.to_vec(),
                config: vec![],
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.requires_replace);
        assert_eq!(response.changes.len(), 1);
        assert!(response.changes[0].before.is_empty());
        assert_eq!(response.changes[0].after, b"\"acme\"");
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_is_a_diagnostic_not_a_status() {
        use generated::provider_server::Provider;
        let (_, grpc) = service();
        let response = grpc
            .create(tonic::Request::new(generated::CreateRequest {
                resource_type: "stub_thing".to_string(),
                planned_state: br#"{"name":"acme"}"#.to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.state.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0]
            .summary
            .starts_with("failed to create thing stub_thing"));
    }

    #[tokio::test]
    async fn test_import_unsupported_by_default() {
        use generated::provider_server::Provider;
        let (_, grpc) = service();
        let response = grpc
            .import_resource_state(tonic::Request::new(
                generated::ImportResourceStateRequest {
                    resource_type: "stub_thing".to_string(),
                    id: "x".to_string(),
                },
            ))
            .await
            .unwrap()
            .into_inner();
        assert!(response.imported.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn test_serve_listener_end_to_end() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_listener(
            StubProvider::default(),
            listener,
            ServeOptions::default().with_shutdown_timeout(Duration::from_secs(1)),
            async move {
                let _ = stop_rx.await;
            },
        ));

        let channel = Channel::from_shared(format!("http://{}", addr))
            .unwrap()
            .connect()
            .await
            .unwrap();
        let mut grpc = Grpc::new(channel);
        let metadata: generated::GetMetadataResponse = api::unary(
            &mut grpc,
            "/hemmer.provider.v1.Provider/GetMetadata",
            generated::GetMetadataRequest {},
        )
        .await
        .unwrap();
        assert_eq!(metadata.resources, vec!["stub_thing"]);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_bootstrapped_channel_reaches_tls_server() {
        use crate::client::channel::{connect, tests::self_signed};
        use crate::config::ConnectionSettings;

        let (cert_pem, key_pem, _) = self_signed();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let service = ProviderServer::new(ProviderGrpcService::new(Arc::new(
            StubProvider::default(),
        )));
        let server = Server::builder()
            .tls_config(ServerTlsConfig::new().identity(Identity::from_pem(cert_pem, key_pem)))
            .unwrap()
            .add_service(service)
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener));
        let handle = tokio::spawn(server);

        let channel = connect(&ConnectionSettings {
            host: "localhost".to_string(),
            port,
            api_key: "k".to_string(),
        })
        .await
        .unwrap();

        let mut grpc = Grpc::new(channel);
        let schema: generated::GetSchemaResponse = api::unary(
            &mut grpc,
            "/hemmer.provider.v1.Provider/GetSchema",
            generated::GetSchemaRequest {},
        )
        .await
        .unwrap();
        assert!(schema.resources.contains_key("stub_thing"));
        handle.abort();
    }
}
