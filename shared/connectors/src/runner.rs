//! Drive a source stream into a destination link.

use crate::{
    error::ConnectorResult,
    sync::{SyncEventStream, SyncLink},
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// What to do when the link rejects an event.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Record the failure and keep going.
    #[default]
    Continue,
    /// Stop at the first failure.
    Abort,
}

/// Sync operation result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSummary {
    pub events_received: u64,
    pub events_written: u64,
    pub errors: Vec<String>,
    pub aborted: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Push every event of `events` into `link`, then close the link.
///
/// A stream error ends the sync. The link is closed on every path; a failure
/// to close is recorded like any other error.
pub async fn pipe<R>(
    mut events: SyncEventStream<R>,
    mut link: Box<dyn SyncLink<R>>,
    policy: ErrorPolicy,
) -> SyncSummary
where
    R: Send + 'static,
{
    let started_at = Utc::now();
    let clock = Instant::now();
    let mut events_received = 0u64;
    let mut events_written = 0u64;
    let mut errors = Vec::new();
    let mut aborted = false;

    while let Some(item) = events.next().await {
        let event = match item {
            Ok(event) => event,
            Err(e) => {
                warn!("Source stream failed after {} event(s): {}", events_received, e);
                errors.push(e.to_string());
                aborted = true;
                break;
            }
        };

        events_received += 1;
        let kind = event.kind();

        match link.send(event).await {
            Ok(()) => events_written += 1,
            Err(e) => {
                debug!("Link rejected {} event #{}: {}", kind, events_received, e);
                errors.push(format!("event {}: {}", events_received, e));
                if policy == ErrorPolicy::Abort {
                    aborted = true;
                    break;
                }
            }
        }
    }

    if let Err(e) = close_link(link).await {
        errors.push(e.to_string());
    }

    let summary = SyncSummary {
        events_received,
        events_written,
        errors,
        aborted,
        started_at,
        duration_ms: clock.elapsed().as_millis() as u64,
    };

    info!(
        received = summary.events_received,
        written = summary.events_written,
        errors = summary.errors.len(),
        aborted = summary.aborted,
        "Sync finished in {}ms",
        summary.duration_ms
    );

    summary
}

async fn close_link<R: Send + 'static>(link: Box<dyn SyncLink<R>>) -> ConnectorResult<()> {
    let stats = link.close().await?;
    debug!("Link closed: {} accepted, {} failed", stats.accepted, stats.failed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ConnectorError,
        sync::{LinkStats, SyncEvent},
    };
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    /// Rejects odd ids, remembers whether it was closed.
    struct PickyLink {
        closed: Arc<AtomicBool>,
        stats: LinkStats,
    }

    #[async_trait]
    impl SyncLink<u32> for PickyLink {
        async fn send(&mut self, event: SyncEvent<u32>) -> ConnectorResult<()> {
            if let SyncEvent::Data { record, .. } = &event {
                if record % 2 == 1 {
                    self.stats.failed += 1;
                    return Err(ConnectorError::Link(format!("odd record {}", record)));
                }
            }
            self.stats.accepted += 1;
            Ok(())
        }

        async fn close(self: Box<Self>) -> ConnectorResult<LinkStats> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(self.stats)
        }
    }

    fn picky() -> (Box<dyn SyncLink<u32>>, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let link = PickyLink {
            closed: closed.clone(),
            stats: LinkStats::default(),
        };
        (Box::new(link), closed)
    }

    fn numbers(upto: u32) -> SyncEventStream<u32> {
        let mut events: Vec<ConnectorResult<SyncEvent<u32>>> = (0..upto)
            .map(|n| Ok(SyncEvent::data("number", n.to_string(), n)))
            .collect();
        events.push(Ok(SyncEvent::Commit));
        futures::stream::iter(events).boxed()
    }

    #[tokio::test]
    async fn test_empty_stream_closes_link() {
        let (link, closed) = picky();
        let summary = pipe(futures::stream::empty().boxed(), link, ErrorPolicy::Continue).await;

        assert_eq!(summary.events_received, 0);
        assert!(summary.errors.is_empty());
        assert!(!summary.aborted);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_continue_policy_records_failures() {
        let (link, closed) = picky();
        let summary = pipe(numbers(4), link, ErrorPolicy::Continue).await;

        assert_eq!(summary.events_received, 5);
        assert_eq!(summary.events_written, 3);
        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors[0].starts_with("event 2:"));
        assert!(!summary.aborted);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let (link, closed) = picky();
        let summary = pipe(numbers(4), link, ErrorPolicy::Abort).await;

        assert_eq!(summary.events_received, 2);
        assert_eq!(summary.events_written, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.aborted);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_stream_error_terminates_sync() {
        let events = async_stream::stream! {
            yield Ok(SyncEvent::data("number", "0", 0u32));
            yield Err(ConnectorError::Stream("upstream went away".to_string()));
            yield Ok(SyncEvent::data("number", "2", 2u32));
        };

        let (link, closed) = picky();
        let summary = pipe(events.boxed(), link, ErrorPolicy::Continue).await;

        assert_eq!(summary.events_received, 1);
        assert_eq!(summary.events_written, 1);
        assert_eq!(summary.errors, vec!["Stream error: upstream went away".to_string()]);
        assert!(summary.aborted);
        assert!(closed.load(Ordering::SeqCst));
    }
}
