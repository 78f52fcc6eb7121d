//! Serialized visit processing.
//!
//! The log document is the only shared mutable resource, so visits must be
//! processed one at a time. `VisitQueue` feeds them to a single worker task
//! in submission order.

use crate::logger::{HistoryLogger, VisitOutcome};
use chrono::Utc;
use histrail_core::{HistResult, ItemId, QueueError, Timestamp};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default number of visits that may wait for the worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// One visit notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitEvent {
    pub item: Option<ItemId>,
    pub at: Timestamp,
}

/// Counters reported when the queue shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Visits processed
    pub processed: usize,
    /// Visits that wrote the log
    pub recorded: usize,
    /// Visits whose write failed
    pub failed: usize,
}

/// Single-worker queue in front of a [`HistoryLogger`].
pub struct VisitQueue {
    sender: mpsc::Sender<VisitEvent>,
    worker: JoinHandle<QueueStats>,
}

impl VisitQueue {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(logger: Arc<HistoryLogger>, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<VisitEvent>(capacity.max(1));

        let worker = tokio::spawn(async move {
            let mut stats = QueueStats::default();
            while let Some(event) = receiver.recv().await {
                stats.processed += 1;
                match logger.record_visit(event.item.clone(), event.at).await {
                    Ok(outcome) => {
                        if outcome.wrote_log() {
                            stats.recorded += 1;
                        }
                        log_outcome(&event, &outcome);
                    }
                    Err(e) => {
                        stats.failed += 1;
                        tracing::warn!(
                            error = %e,
                            item = ?event.item,
                            "Failed to record visit"
                        );
                    }
                }
            }
            tracing::debug!(processed = stats.processed, "visit worker stopped");
            stats
        });

        Self { sender, worker }
    }

    /// Spawn with [`DEFAULT_QUEUE_CAPACITY`].
    pub fn spawn_default(logger: Arc<HistoryLogger>) -> Self {
        Self::spawn(logger, DEFAULT_QUEUE_CAPACITY)
    }

    /// Queue a visit happening now.
    pub async fn submit(&self, item: Option<ItemId>) -> HistResult<()> {
        self.submit_at(item, Utc::now()).await
    }

    /// Queue a visit at `at`. Waits while the queue is full.
    pub async fn submit_at(&self, item: Option<ItemId>, at: Timestamp) -> HistResult<()> {
        self.sender
            .send(VisitEvent { item, at })
            .await
            .map_err(|_| QueueError::Closed)?;
        Ok(())
    }

    /// Stop accepting visits, drain the queue and wait for the worker.
    pub async fn shutdown(self) -> HistResult<QueueStats> {
        drop(self.sender);
        let stats = self.worker.await.map_err(|e| QueueError::WorkerFailed {
            reason: e.to_string(),
        })?;
        Ok(stats)
    }
}

fn log_outcome(event: &VisitEvent, outcome: &VisitOutcome) {
    match outcome {
        VisitOutcome::Recorded { trail } => tracing::debug!(
            item = ?event.item,
            linked = trail.is_some(),
            "queued visit recorded"
        ),
        VisitOutcome::RetentionOnly => {
            tracing::debug!(item = ?event.item, "queued visit applied retention only")
        }
        VisitOutcome::Skipped(reason) => {
            tracing::debug!(item = ?event.item, reason = ?reason, "queued visit skipped")
        }
    }
}
