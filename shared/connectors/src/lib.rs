pub mod config;
pub mod erased;
pub mod error;
pub mod registry;
pub mod runner;
pub mod schema;
pub mod sync;
pub mod webhook;

pub use erased::DynConnector;
pub use error::{ConnectorError, ConnectorResult};
pub use schema::{ConnectorSchema, SchemaDescription};
pub use sync::{LinkStats, LogLink, LogLinkOptions, SyncEvent, SyncEventStream, SyncLink};
pub use webhook::{ResourceUpdate, WebhookOutcome, WebhookResponse};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Connector metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorMetadata {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Record type of a connector's schema binding.
pub type RecordOf<C> = <<C as ConnectorServer>::Schema as ConnectorSchema>::Record;

/// Webhook outcome type of a connector's schema binding.
pub type OutcomeOf<C> = WebhookOutcome<
    <<C as ConnectorServer>::Schema as ConnectorSchema>::ResourceSettings,
    <<C as ConnectorServer>::Schema as ConnectorSchema>::WebhookBody,
>;

/// Capability surface every connector exposes.
///
/// All three capabilities are required; a connector with nothing to offer
/// for one of them implements it as a no-op (an empty stream, a link that
/// drops events, an empty update list).
#[async_trait]
pub trait ConnectorServer: Send + Sync + 'static {
    type Schema: ConnectorSchema;

    fn metadata(&self) -> &ConnectorMetadata;

    /// Start pulling events from the external system. An empty stream means
    /// there is nothing to sync.
    fn source_sync(
        &self,
        config: <Self::Schema as ConnectorSchema>::SourceConfig,
    ) -> ConnectorResult<SyncEventStream<RecordOf<Self>>>;

    /// Open a link that writes events into the external system. The caller
    /// owns the link and must close it.
    fn destination_sync(
        &self,
        config: <Self::Schema as ConnectorSchema>::DestinationConfig,
    ) -> ConnectorResult<Box<dyn SyncLink<RecordOf<Self>>>>;

    /// Translate an inbound webhook call into resource updates plus the
    /// immediate response.
    async fn handle_webhook(
        &self,
        input: <Self::Schema as ConnectorSchema>::WebhookInput,
    ) -> ConnectorResult<OutcomeOf<Self>>;
}

/// Factory for creating connector instances from instance settings
pub trait ConnectorFactory: Send + Sync {
    fn connector_type(&self) -> &str;

    fn create(&self, settings: &serde_json::Value) -> ConnectorResult<Arc<dyn DynConnector>>;
}
