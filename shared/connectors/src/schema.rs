//! Schema binding for connectors.
//!
//! Every connector declares one [`ConnectorSchema`] describing the shapes it
//! exchanges. The associated types are checked at compile time by the
//! [`ConnectorServer`](crate::ConnectorServer) contract and can be described
//! as JSON schema at runtime for clients of the webhook service.

use schemars::{gen::SchemaGenerator, JsonSchema};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Shape of everything a connector consumes and produces.
pub trait ConnectorSchema: Send + Sync + 'static {
    /// Configuration accepted by `source_sync`.
    type SourceConfig: DeserializeOwned + JsonSchema + Send + 'static;
    /// Configuration accepted by `destination_sync`.
    type DestinationConfig: DeserializeOwned + JsonSchema + Send + 'static;
    /// Payload carried by data sync events.
    type Record: Serialize + DeserializeOwned + JsonSchema + Send + 'static;
    /// Inbound webhook body.
    type WebhookInput: DeserializeOwned + JsonSchema + Send + 'static;
    /// Body of the immediate webhook response.
    type WebhookBody: Serialize + JsonSchema + Send + 'static;
    /// Settings attached to each resource update.
    type ResourceSettings: Serialize + JsonSchema + Send + 'static;
}

/// JSON schemas of a connector's schema binding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaDescription {
    pub source_config: Value,
    pub destination_config: Value,
    pub record: Value,
    pub webhook_input: Value,
    pub webhook_body: Value,
    pub resource_settings: Value,
}

impl SchemaDescription {
    pub fn of<S: ConnectorSchema>() -> Self {
        Self {
            source_config: schema_value::<S::SourceConfig>(),
            destination_config: schema_value::<S::DestinationConfig>(),
            record: schema_value::<S::Record>(),
            webhook_input: schema_value::<S::WebhookInput>(),
            webhook_body: schema_value::<S::WebhookBody>(),
            resource_settings: schema_value::<S::ResourceSettings>(),
        }
    }
}

fn schema_value<T: JsonSchema>() -> Value {
    let root = SchemaGenerator::default().into_root_schema_for::<T>();
    serde_json::to_value(root).unwrap_or(Value::Null)
}
