//! Visit pipeline.
//!
//! `HistoryLogger` turns one visit notification into at most one write of
//! the log document. Every failure before that write is handled locally:
//! the visit is skipped or the affected step degrades, and a tracing record
//! is emitted. Only a failed write is returned as an error.

use crate::annotator::{TrailAnnotator, TrailLink};
use crate::repair::repair_head_title;
use histrail_core::{
    sanitize_title, HistConfig, HistResult, HistoryLog, ItemId, LogEntry, RetentionPolicy,
    StorageError, Timestamp,
};
use histrail_storage::{ActiveItemSource, DocumentFields, DocumentStore};
use serde::Serialize;
use std::sync::{Arc, RwLock};

// ============================================================================
// OUTCOMES
// ============================================================================

/// Why a visit left the log untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No item was active
    NoActiveItem,
    /// The visited item could not be fetched
    ItemUnavailable,
    /// The visited item is the log document itself
    LogDocument,
    /// The visited item is on the exclusion list
    Excluded,
    /// No log document is configured, or it could not be fetched
    LogUnavailable,
    /// The newest entry already records this item today
    Duplicate,
}

/// Result of processing one visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitOutcome {
    /// A new entry was written.
    Recorded {
        /// Entry the visit was linked to, if the trail walk found one
        trail: Option<TrailLink>,
    },
    /// Retention changed the log but the visit was a duplicate afterwards.
    RetentionOnly,
    /// Nothing was written.
    Skipped(SkipReason),
}

impl VisitOutcome {
    /// Whether the log document was written.
    pub fn wrote_log(&self) -> bool {
        !matches!(self, VisitOutcome::Skipped(_))
    }
}

// ============================================================================
// LOGGER
// ============================================================================

/// Records visits into the log document.
///
/// Concurrent calls are not coordinated: two visits processed at once can
/// overwrite each other's write. Use [`crate::VisitQueue`] to serialize them.
pub struct HistoryLogger {
    store: Arc<dyn DocumentStore>,
    active: Option<Arc<dyn ActiveItemSource>>,
    config: RwLock<Arc<HistConfig>>,
}

impl HistoryLogger {
    /// Create a logger over `store` with a configuration snapshot.
    pub fn new(store: Arc<dyn DocumentStore>, config: HistConfig) -> Self {
        Self {
            store,
            active: None,
            config: RwLock::new(Arc::new(config)),
        }
    }

    /// Attach the source used by [`HistoryLogger::record_active_visit`].
    pub fn with_active_source(mut self, active: Arc<dyn ActiveItemSource>) -> Self {
        self.active = Some(active);
        self
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> HistResult<Arc<HistConfig>> {
        Ok(self
            .config
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone())
    }

    /// Replace the configuration. Runs already in progress keep their
    /// snapshot.
    pub fn update_config(&self, config: HistConfig) -> HistResult<()> {
        *self
            .config
            .write()
            .map_err(|_| StorageError::LockPoisoned)? = Arc::new(config);
        Ok(())
    }

    /// Record a visit to whatever item the active item source reports.
    pub async fn record_active_visit(&self, now: Timestamp) -> HistResult<VisitOutcome> {
        let item = match &self.active {
            Some(source) => match source.active_item().await {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(error = %e, "Active item lookup failed");
                    None
                }
            },
            None => None,
        };
        self.record_visit(item, now).await
    }

    /// Record a visit to `item` at `now`.
    pub async fn record_visit(
        &self,
        item: Option<ItemId>,
        now: Timestamp,
    ) -> HistResult<VisitOutcome> {
        let config = self.config()?;

        let Some(item_id) = item else {
            tracing::debug!("no active item, visit skipped");
            return Ok(VisitOutcome::Skipped(SkipReason::NoActiveItem));
        };

        let visited = match self
            .store
            .fetch_document(&item_id, DocumentFields::TITLE | DocumentFields::BODY)
            .await
        {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, item = %item_id, "Visited item unavailable");
                return Ok(VisitOutcome::Skipped(SkipReason::ItemUnavailable));
            }
        };

        if config.hist_note_id.as_ref() == Some(&item_id) {
            return Ok(VisitOutcome::Skipped(SkipReason::LogDocument));
        }
        if config.is_excluded(&item_id) {
            tracing::debug!(item = %item_id, "excluded item, visit skipped");
            return Ok(VisitOutcome::Skipped(SkipReason::Excluded));
        }

        let Some(log_id) = config.hist_note_id.clone() else {
            tracing::warn!("No history log document configured");
            return Ok(VisitOutcome::Skipped(SkipReason::LogUnavailable));
        };
        let body = match self
            .store
            .fetch_document(&log_id, DocumentFields::BODY)
            .await
        {
            Ok(doc) => doc.body.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, log = %log_id, "History log document unavailable");
                return Ok(VisitOutcome::Skipped(SkipReason::LogUnavailable));
            }
        };
        let mut log = HistoryLog::parse(&body);

        if is_duplicate(&log, &item_id, now) {
            tracing::debug!(item = %item_id, "duplicate visit skipped");
            return Ok(VisitOutcome::Skipped(SkipReason::Duplicate));
        }

        let report = RetentionPolicy::from_config(&config).apply(&mut log, now);
        if report.changed() {
            tracing::debug!(
                suppressed = ?report.suppressed,
                stripped = ?report.stripped_levels,
                pruned = report.pruned,
                "retention applied"
            );
        }

        if is_duplicate(&log, &item_id, now) {
            if !report.changed() {
                return Ok(VisitOutcome::Skipped(SkipReason::Duplicate));
            }
            self.store
                .write_document_body(&log_id, &log.render())
                .await?;
            return Ok(VisitOutcome::RetentionOnly);
        }

        repair_head_title(
            &mut log,
            self.store.as_ref(),
            &config.untitled_placeholder,
            config.trail_format,
        )
        .await;

        let title = visited
            .title
            .as_deref()
            .map(sanitize_title)
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| config.untitled_placeholder.clone());
        log.prepend(
            LogEntry::new(now, item_id.clone(), title),
            config.trail_format,
        );

        let trail = if config.trails_enabled() {
            let trigger_body = visited.body.as_deref().unwrap_or_default();
            TrailAnnotator::new(self.store.as_ref(), &config)
                .annotate(&mut log, &item_id, trigger_body)
                .await
        } else {
            None
        };

        self.store
            .write_document_body(&log_id, &log.render())
            .await?;

        tracing::debug!(item = %item_id, linked = ?trail.as_ref().map(|t| &t.item_id), "visit recorded");
        Ok(VisitOutcome::Recorded { trail })
    }
}

/// Whether the newest entry already records `item` on the same day as `now`.
fn is_duplicate(log: &HistoryLog, item: &ItemId, now: Timestamp) -> bool {
    log.head()
        .is_some_and(|head| &head.item_id == item && head.same_day_as(now))
}
