//! Type-erased view of connectors.
//!
//! The registry and the HTTP boundary only see JSON. Every
//! [`ConnectorServer`] gets a [`DynConnector`] implementation that decodes
//! configs and webhook inputs into its schema types and encodes records and
//! responses back to JSON.

use crate::{
    error::{ConnectorError, ConnectorResult},
    schema::{ConnectorSchema, SchemaDescription},
    sync::{LinkStats, SyncEvent, SyncEventStream, SyncLink},
    webhook::{ResourceUpdate, WebhookOutcome, WebhookResponse},
    ConnectorMetadata, ConnectorServer,
};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

#[async_trait]
pub trait DynConnector: Send + Sync {
    fn metadata(&self) -> &ConnectorMetadata;

    fn schema(&self) -> SchemaDescription;

    fn source_sync(&self, config: Value) -> ConnectorResult<SyncEventStream<Value>>;

    fn destination_sync(&self, config: Value) -> ConnectorResult<Box<dyn SyncLink<Value>>>;

    async fn handle_webhook(&self, input: Value) -> ConnectorResult<WebhookOutcome<Value, Value>>;
}

#[async_trait]
impl<C> DynConnector for C
where
    C: ConnectorServer,
{
    fn metadata(&self) -> &ConnectorMetadata {
        ConnectorServer::metadata(self)
    }

    fn schema(&self) -> SchemaDescription {
        SchemaDescription::of::<C::Schema>()
    }

    fn source_sync(&self, config: Value) -> ConnectorResult<SyncEventStream<Value>> {
        let config = decode::<<C::Schema as ConnectorSchema>::SourceConfig>("source config", config)?;
        let events = ConnectorServer::source_sync(self, config)?;

        Ok(events
            .map(|item| item.and_then(|event| event.try_map_record(encode)))
            .boxed())
    }

    fn destination_sync(&self, config: Value) -> ConnectorResult<Box<dyn SyncLink<Value>>> {
        let config =
            decode::<<C::Schema as ConnectorSchema>::DestinationConfig>("destination config", config)?;
        let inner = ConnectorServer::destination_sync(self, config)?;

        Ok(Box::new(JsonLink {
            inner,
            rejected: 0,
        }))
    }

    async fn handle_webhook(&self, input: Value) -> ConnectorResult<WebhookOutcome<Value, Value>> {
        let input = decode::<<C::Schema as ConnectorSchema>::WebhookInput>("webhook input", input)?;
        let outcome = ConnectorServer::handle_webhook(self, input).await?;

        let resource_updates = outcome
            .resource_updates
            .into_iter()
            .map(|update| {
                Ok(ResourceUpdate {
                    id: update.id,
                    settings: encode(update.settings)?,
                    trigger_default_sync: update.trigger_default_sync,
                })
            })
            .collect::<ConnectorResult<Vec<_>>>()?;

        Ok(WebhookOutcome {
            resource_updates,
            response: WebhookResponse {
                status: outcome.response.status,
                body: encode(outcome.response.body)?,
            },
        })
    }
}

/// Link adapter decoding JSON events into a connector's record type.
struct JsonLink<R: Send + 'static> {
    inner: Box<dyn SyncLink<R>>,
    rejected: u64,
}

#[async_trait]
impl<R> SyncLink<Value> for JsonLink<R>
where
    R: DeserializeOwned + Send + 'static,
{
    async fn send(&mut self, event: SyncEvent<Value>) -> ConnectorResult<()> {
        let event = match event.try_map_record(|record| decode::<R>("record", record)) {
            Ok(event) => event,
            Err(e) => {
                self.rejected += 1;
                return Err(e);
            }
        };
        self.inner.send(event).await
    }

    async fn close(self: Box<Self>) -> ConnectorResult<LinkStats> {
        let JsonLink { inner, rejected } = *self;
        let mut stats = inner.close().await?;
        stats.failed += rejected;
        Ok(stats)
    }
}

/// Decode a JSON value into a schema type. A missing value (`null`) falls back
/// to an empty object so configs with all-default fields can be omitted.
pub(crate) fn decode<T: DeserializeOwned>(what: &str, value: Value) -> ConnectorResult<T> {
    let result = if value.is_null() {
        serde_json::from_value(Value::Null)
            .or_else(|_| serde_json::from_value(Value::Object(serde_json::Map::new())))
    } else {
        serde_json::from_value(value)
    };

    result.map_err(|e| ConnectorError::InvalidPayload(format!("Invalid {}: {}", what, e)))
}

fn encode<T: Serialize>(value: T) -> ConnectorResult<Value> {
    Ok(serde_json::to_value(value)?)
}
