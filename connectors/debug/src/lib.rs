//! Debug connector.
//!
//! Reference implementation of the connector contract, used for manual
//! testing and log inspection. Webhook payloads are echoed back untouched.

use async_trait::async_trait;
use conhub_connectors::{
    ConnectorError, ConnectorFactory, ConnectorMetadata, ConnectorResult, ConnectorSchema,
    ConnectorServer, DynConnector, LogLink, LogLinkOptions, SyncEventStream, SyncLink,
    WebhookOutcome,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEBUG_CONNECTOR_ID: &str = "debug";

/// Per-call overrides for the destination log link.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct DebugDestinationConfig {
    pub prefix: Option<String>,
    pub verbose: Option<bool>,
}

/// Webhook response body: the received payload, untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct DebugEcho {
    pub echo: Value,
}

pub struct DebugSchema;

impl ConnectorSchema for DebugSchema {
    type SourceConfig = Value;
    type DestinationConfig = DebugDestinationConfig;
    type Record = Value;
    type WebhookInput = Value;
    type WebhookBody = DebugEcho;
    type ResourceSettings = Value;
}

pub struct DebugConnector {
    metadata: ConnectorMetadata,
    link_defaults: LogLinkOptions,
}

impl DebugConnector {
    pub fn new() -> Self {
        Self::with_link_defaults(LogLinkOptions {
            prefix: DEBUG_CONNECTOR_ID.to_string(),
            verbose: true,
        })
    }

    pub fn with_link_defaults(link_defaults: LogLinkOptions) -> Self {
        Self {
            metadata: ConnectorMetadata {
                id: DEBUG_CONNECTOR_ID.to_string(),
                name: "Debug".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: "Empty source, logging destination, echoing webhook".to_string(),
            },
            link_defaults,
        }
    }

    /// Build a connector whose link defaults are overridden by instance
    /// settings. `null` keeps the defaults.
    pub fn from_settings(settings: &Value) -> ConnectorResult<Self> {
        if settings.is_null() {
            return Ok(Self::new());
        }

        let overrides: DebugDestinationConfig = serde_json::from_value(settings.clone())
            .map_err(|e| ConnectorError::Configuration(format!("Invalid debug settings: {}", e)))?;
        let defaults = Self::new().link_defaults;
        Ok(Self::with_link_defaults(LogLinkOptions {
            prefix: overrides.prefix.unwrap_or(defaults.prefix),
            verbose: overrides.verbose.unwrap_or(defaults.verbose),
        }))
    }

    pub fn link_defaults(&self) -> &LogLinkOptions {
        &self.link_defaults
    }
}

impl Default for DebugConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectorServer for DebugConnector {
    type Schema = DebugSchema;

    fn metadata(&self) -> &ConnectorMetadata {
        &self.metadata
    }

    fn source_sync(&self, _config: Value) -> ConnectorResult<SyncEventStream<Value>> {
        debug!("[Debug Connector] Source sync requested, nothing to emit");
        Ok(Box::pin(futures::stream::empty()))
    }

    fn destination_sync(&self, config: DebugDestinationConfig) -> ConnectorResult<Box<dyn SyncLink<Value>>> {
        let options = LogLinkOptions {
            prefix: config.prefix.unwrap_or_else(|| self.link_defaults.prefix.clone()),
            verbose: config.verbose.unwrap_or(self.link_defaults.verbose),
        };
        info!(
            "[Debug Connector] Opening log link (prefix={}, verbose={})",
            options.prefix, options.verbose
        );
        Ok(Box::new(LogLink::new(options)))
    }

    async fn handle_webhook(&self, input: Value) -> ConnectorResult<WebhookOutcome<Value, DebugEcho>> {
        Ok(WebhookOutcome::respond(DebugEcho { echo: input }))
    }
}

/// Creates debug connectors. Instance settings, when present, replace the
/// default log link options.
#[derive(Debug, Default)]
pub struct DebugConnectorFactory;

impl DebugConnectorFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ConnectorFactory for DebugConnectorFactory {
    fn connector_type(&self) -> &str {
        DEBUG_CONNECTOR_ID
    }

    fn create(&self, settings: &Value) -> ConnectorResult<Arc<dyn DynConnector>> {
        Ok(Arc::new(DebugConnector::from_settings(settings)?))
    }
}
