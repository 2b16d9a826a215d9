//! The ChirpStack provider: configuration, connection and dispatch.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::client::{connect, Chirpstack, GrpcChirpstack};
use crate::config::ProviderConfig;
use crate::data_sources::ListDataSource;
use crate::error::ProviderError;
use crate::resources::Registry;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// Manages ChirpStack tenants, applications, devices and gateways.
///
/// The connection is made by the first successful `Configure` and shared by
/// every later call. Further `Configure` calls keep it and return a warning.
pub struct ChirpstackProvider {
    client: OnceCell<Arc<dyn Chirpstack>>,
    resources: Registry,
}

impl ChirpstackProvider {
    pub fn new() -> Self {
        Self {
            client: OnceCell::new(),
            resources: Registry::new(),
        }
    }

    /// An already-configured provider using `client`.
    pub fn with_client(client: Arc<dyn Chirpstack>) -> Self {
        Self {
            client: OnceCell::new_with(Some(client)),
            resources: Registry::new(),
        }
    }

    fn client(&self) -> Result<&dyn Chirpstack, ProviderError> {
        self.client
            .get()
            .map(|c| c.as_ref())
            .ok_or(ProviderError::NotConfigured)
    }
}

impl Default for ChirpstackProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProviderService for ChirpstackProvider {
    fn schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        for resource in self.resources.iter() {
            schema = schema.with_resource(resource.type_name(), resource.schema());
        }
        for data_source in ListDataSource::ALL {
            schema = schema.with_data_source(data_source.type_name(), data_source.schema());
        }
        schema
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        if self.client.initialized() {
            warn!("Provider already configured, keeping the existing connection");
            return Ok(vec![Diagnostic::warning(
                "provider is already configured; keeping the existing connection",
            )]);
        }

        let settings = ProviderConfig::from_value(config)?.resolve()?;
        self.client
            .get_or_try_init(|| async {
                let channel = connect(&settings).await?;
                Ok::<_, ProviderError>(Arc::new(GrpcChirpstack::new(channel)) as Arc<dyn Chirpstack>)
            })
            .await?;
        Ok(vec![])
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let resource = self.resources.get(resource_type)?;
        let plan = resource.plan(prior_state.as_ref(), proposed_state);
        debug!(
            resource_type = %resource_type,
            changes = plan.changes.len(),
            requires_replace = plan.requires_replace,
            "Planned"
        );
        Ok(plan)
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resources.get(resource_type)?;
        resource.create(self.client()?, planned_state).await
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resources.get(resource_type)?;
        resource.read(self.client()?, current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resources.get(resource_type)?;
        resource
            .update(self.client()?, prior_state, planned_state)
            .await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resources.get(resource_type)?;
        resource.delete(self.client()?, current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resources.get(resource_type)?;
        let state = resource.import(self.client()?, id).await?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = ListDataSource::from_type_name(data_source_type)?;
        data_source.read(self.client()?, config).await
    }
}
