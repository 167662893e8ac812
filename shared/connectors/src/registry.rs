use crate::{
    config::{ConnectorConfigManager, ConnectorInstanceConfig},
    erased::DynConnector,
    error::{ConnectorError, ConnectorResult},
    runner::{pipe, ErrorPolicy, SyncSummary},
    schema::SchemaDescription,
    sync::{SyncEventStream, SyncLink},
    webhook::WebhookOutcome,
    ConnectorFactory, ConnectorMetadata, ConnectorServer,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// An active connector instance as listed by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveConnector {
    pub instance_id: String,
    pub metadata: ConnectorMetadata,
}

/// Source-to-destination sync between two registered connectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    pub source: String,
    #[serde(default)]
    pub source_config: Value,
    pub destination: String,
    #[serde(default)]
    pub destination_config: Value,
    #[serde(default)]
    pub policy: ErrorPolicy,
}

/// Registry mapping connector identifiers to instances
pub struct ConnectorRegistry {
    factories: HashMap<String, Box<dyn ConnectorFactory>>,
    active: Arc<RwLock<HashMap<String, Arc<dyn DynConnector>>>>,
    instance_configs: Arc<RwLock<HashMap<String, ConnectorInstanceConfig>>>,
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            active: Arc::new(RwLock::new(HashMap::new())),
            instance_configs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a connector factory. Malformed or duplicate types are rejected.
    pub fn register_factory(&mut self, factory: Box<dyn ConnectorFactory>) -> ConnectorResult<()> {
        let connector_type = factory.connector_type().to_string();
        validate_id(&connector_type)?;

        if self.factories.contains_key(&connector_type) {
            return Err(ConnectorError::AlreadyExists(format!(
                "Connector type '{}' is already registered",
                connector_type
            )));
        }

        info!("[Connector Registry] Registered connector type '{}'", connector_type);
        self.factories.insert(connector_type, factory);
        Ok(())
    }

    /// Register a ready connector under its metadata id.
    pub async fn register<C: ConnectorServer>(&self, connector: C) -> ConnectorResult<()> {
        let instance_id = ConnectorServer::metadata(&connector).id.clone();
        self.insert_active(instance_id, Arc::new(connector)).await
    }

    /// Create an instance from its factory and make it active.
    pub async fn activate(&self, config: &ConnectorInstanceConfig) -> ConnectorResult<()> {
        let factory = self.factories.get(&config.connector_type).ok_or_else(|| {
            ConnectorError::NotFound(format!("Connector type '{}' not found", config.connector_type))
        })?;

        let connector = factory.create(&config.settings)?;
        self.insert_active(config.instance_id.clone(), connector).await?;

        let mut configs = self.instance_configs.write().await;
        configs.insert(config.instance_id.clone(), config.clone());
        Ok(())
    }

    /// Activate every enabled instance of `manager`. Failures are logged and
    /// returned; they do not stop the remaining instances.
    pub async fn activate_all(&self, manager: &ConnectorConfigManager) -> Vec<(String, ConnectorError)> {
        let mut failures = Vec::new();
        for config in manager.list_enabled() {
            if let Err(e) = self.activate(config).await {
                warn!("[Connector Registry] Failed to activate '{}': {}", config.instance_id, e);
                failures.push((config.instance_id.clone(), e));
            }
        }
        failures
    }

    pub async fn deactivate(&self, instance_id: &str) -> ConnectorResult<()> {
        let removed = self.active.write().await.remove(instance_id);
        self.instance_configs.write().await.remove(instance_id);

        match removed {
            Some(_) => {
                info!("[Connector Registry] Deactivated '{}'", instance_id);
                Ok(())
            }
            None => Err(not_found(instance_id)),
        }
    }

    pub async fn get(&self, instance_id: &str) -> Option<Arc<dyn DynConnector>> {
        self.active.read().await.get(instance_id).cloned()
    }

    pub async fn instance_config(&self, instance_id: &str) -> Option<ConnectorInstanceConfig> {
        self.instance_configs.read().await.get(instance_id).cloned()
    }

    pub fn list_connector_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }

    pub async fn list_active(&self) -> Vec<ActiveConnector> {
        let active = self.active.read().await;
        let mut listed: Vec<ActiveConnector> = active
            .iter()
            .map(|(instance_id, connector)| ActiveConnector {
                instance_id: instance_id.clone(),
                metadata: connector.metadata().clone(),
            })
            .collect();
        listed.sort_by(|a, b| a.instance_id.cmp(&b.instance_id));
        listed
    }

    pub async fn describe(&self, instance_id: &str) -> ConnectorResult<SchemaDescription> {
        Ok(self.require(instance_id).await?.schema())
    }

    pub async fn source_sync(&self, instance_id: &str, config: Value) -> ConnectorResult<SyncEventStream<Value>> {
        self.require(instance_id).await?.source_sync(config)
    }

    pub async fn destination_sync(
        &self,
        instance_id: &str,
        config: Value,
    ) -> ConnectorResult<Box<dyn SyncLink<Value>>> {
        self.require(instance_id).await?.destination_sync(config)
    }

    pub async fn handle_webhook(
        &self,
        instance_id: &str,
        input: Value,
    ) -> ConnectorResult<WebhookOutcome<Value, Value>> {
        let connector = self.require(instance_id).await?;
        connector.handle_webhook(input).await
    }

    /// Pipe one connector's source into another connector's destination.
    pub async fn run_sync(&self, request: SyncRequest) -> ConnectorResult<SyncSummary> {
        let source = self.require(&request.source).await?;
        let destination = self.require(&request.destination).await?;

        info!(
            "[Connector Registry] Syncing '{}' -> '{}'",
            request.source, request.destination
        );

        let events = source.source_sync(request.source_config)?;
        let link = destination.destination_sync(request.destination_config)?;
        Ok(pipe(events, link, request.policy).await)
    }

    async fn require(&self, instance_id: &str) -> ConnectorResult<Arc<dyn DynConnector>> {
        self.get(instance_id).await.ok_or_else(|| not_found(instance_id))
    }

    async fn insert_active(&self, instance_id: String, connector: Arc<dyn DynConnector>) -> ConnectorResult<()> {
        validate_id(&instance_id)?;

        let mut active = self.active.write().await;
        if active.contains_key(&instance_id) {
            return Err(ConnectorError::AlreadyExists(format!(
                "Connector '{}' is already active",
                instance_id
            )));
        }

        info!(
            "[Connector Registry] Activated '{}' ({} v{})",
            instance_id,
            connector.metadata().name,
            connector.metadata().version
        );
        active.insert(instance_id, connector);
        Ok(())
    }
}

fn not_found(instance_id: &str) -> ConnectorError {
    ConnectorError::NotFound(format!("Connector '{}' not found", instance_id))
}

/// Identifiers are lowercase ascii words joined by `-` or `_`.
fn validate_id(id: &str) -> ConnectorResult<()> {
    let well_formed = id
        .chars()
        .next()
        .map_or(false, |first| first.is_ascii_lowercase() || first.is_ascii_digit())
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(ConnectorError::Validation(format!("Invalid connector id '{}'", id)))
    }
}
