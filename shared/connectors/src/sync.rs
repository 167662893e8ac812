//! Sync events, event streams and destination links.

use crate::error::{ConnectorError, ConnectorResult};
use async_trait::async_trait;
use futures::stream::BoxStream;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::{debug, info};

/// A unit of data change exchanged between a source and a destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent<R> {
    Data { entity: String, id: String, record: R },
    /// Everything emitted so far can be persisted.
    Commit,
    /// The source has caught up and is now streaming live changes.
    Ready,
}

impl<R> SyncEvent<R> {
    pub fn data(entity: impl Into<String>, id: impl Into<String>, record: R) -> Self {
        SyncEvent::Data {
            entity: entity.into(),
            id: id.into(),
            record,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::Data { .. } => "data",
            SyncEvent::Commit => "commit",
            SyncEvent::Ready => "ready",
        }
    }

    pub fn try_map_record<T, E>(self, f: impl FnOnce(R) -> Result<T, E>) -> Result<SyncEvent<T>, E> {
        Ok(match self {
            SyncEvent::Data { entity, id, record } => SyncEvent::Data {
                entity,
                id,
                record: f(record)?,
            },
            SyncEvent::Commit => SyncEvent::Commit,
            SyncEvent::Ready => SyncEvent::Ready,
        })
    }
}

/// Lazy, possibly infinite sequence of sync events. An `Err` item ends the sync.
pub type SyncEventStream<R> = BoxStream<'static, ConnectorResult<SyncEvent<R>>>;

/// Counters reported by a link when it is closed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkStats {
    pub accepted: u64,
    pub failed: u64,
}

/// Consumer side of a destination sync.
///
/// The caller that obtained the link owns it and must `close` it; errors are
/// reported per event and do not poison the link.
#[async_trait]
pub trait SyncLink<R: Send + 'static>: Send {
    async fn send(&mut self, event: SyncEvent<R>) -> ConnectorResult<()>;

    async fn close(self: Box<Self>) -> ConnectorResult<LinkStats>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct LogLinkOptions {
    pub prefix: String,
    pub verbose: bool,
}

impl Default for LogLinkOptions {
    fn default() -> Self {
        Self {
            prefix: "sync".to_string(),
            verbose: false,
        }
    }
}

/// Link that logs every event it receives.
pub struct LogLink<R> {
    options: LogLinkOptions,
    stats: LinkStats,
    _record: PhantomData<fn(R)>,
}

impl<R> LogLink<R> {
    pub fn new(options: LogLinkOptions) -> Self {
        Self {
            options,
            stats: LinkStats::default(),
            _record: PhantomData,
        }
    }

    pub fn options(&self) -> &LogLinkOptions {
        &self.options
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }
}

#[async_trait]
impl<R> SyncLink<R> for LogLink<R>
where
    R: Serialize + Send + 'static,
{
    async fn send(&mut self, event: SyncEvent<R>) -> ConnectorResult<()> {
        if self.options.verbose {
            let rendered = match serde_json::to_string(&event) {
                Ok(rendered) => rendered,
                Err(e) => {
                    self.stats.failed += 1;
                    return Err(ConnectorError::Link(format!(
                        "Failed to render {} event: {}",
                        event.kind(),
                        e
                    )));
                }
            };
            info!("[{}] {}", self.options.prefix, rendered);
        } else {
            match &event {
                SyncEvent::Data { entity, id, .. } => {
                    debug!("[{}] data {}/{}", self.options.prefix, entity, id)
                }
                other => debug!("[{}] {}", self.options.prefix, other.kind()),
            }
        }

        self.stats.accepted += 1;
        Ok(())
    }

    async fn close(self: Box<Self>) -> ConnectorResult<LinkStats> {
        info!(
            accepted = self.stats.accepted,
            failed = self.stats.failed,
            "[{}] link closed",
            self.options.prefix
        );
        Ok(self.stats)
    }
}
