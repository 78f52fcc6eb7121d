//! Trail annotation.
//!
//! After a visit is prepended, the annotator walks older entries looking for
//! the nearest one linked to the visited item. When it finds one further
//! back than the adjacent entry, every entry strictly between the two gets a
//! trail level so the renderer can draw a line connecting them.
//!
//! Walk positions count parsed entries only. Position 0 is the new entry.

use crate::linkage::LinkPolicy;
use histrail_core::{
    HistConfig, HistoryLog, ItemId, LevelAllocator, TrailFormat, TrailLevel, ADJACENT_LEVEL,
    FIRST_TRAIL_LEVEL,
};
use histrail_storage::{DocumentFields, DocumentStore};
use serde::Serialize;
use std::collections::HashSet;

/// The entry a visit was linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailLink {
    /// Linked item
    pub item_id: ItemId,
    /// Walk position of the linked entry (1 = adjacent)
    pub position: usize,
    /// Line index of the linked entry in the log
    pub line_index: usize,
    /// Level assigned to the trail; 1 for an adjacent link, never persisted
    pub level: TrailLevel,
}

impl TrailLink {
    /// Whether the link was recorded on intermediate entries.
    pub fn is_recorded(&self) -> bool {
        self.level >= FIRST_TRAIL_LEVEL
    }
}

// ============================================================================
// WALK STATE
// ============================================================================

/// Per-run state of one walk. Nothing survives between runs.
#[derive(Debug, Default)]
struct WalkState {
    /// Items already proven unlinked in this run
    unlinked: HashSet<ItemId>,
    /// Levels seen along the walked prefix
    levels: LevelAllocator,
    /// Line indices of the walked entries, position 0 first
    walked: Vec<usize>,
}

// ============================================================================
// ANNOTATOR
// ============================================================================

/// Walks the log from the newest entry and records trail levels.
pub struct TrailAnnotator<'a> {
    store: &'a dyn DocumentStore,
    policy: LinkPolicy,
    trail_length: u32,
    trail_records: u32,
    format: TrailFormat,
}

impl<'a> TrailAnnotator<'a> {
    /// Build from the configuration snapshot.
    pub fn new(store: &'a dyn DocumentStore, config: &HistConfig) -> Self {
        Self {
            store,
            policy: LinkPolicy::from_config(config),
            trail_length: config.trail_length,
            trail_records: config.trail_records,
            format: config.trail_format,
        }
    }

    /// Find the nearest entry linked to `trigger` and annotate the entries
    /// between it and the newest entry.
    ///
    /// `trigger_body` is the content of the visited item. Candidates that
    /// cannot be fetched count as unlinked. Returns `None` when the walk hits
    /// the end of the log, the search length or the level limit first.
    pub async fn annotate(
        &self,
        log: &mut HistoryLog,
        trigger: &ItemId,
        trigger_body: &str,
    ) -> Option<TrailLink> {
        let candidates: Vec<(usize, ItemId, Vec<TrailLevel>)> = log
            .entries()
            .map(|(index, entry)| {
                (
                    index,
                    entry.item_id.clone(),
                    entry.trails.iter().copied().collect(),
                )
            })
            .collect();

        let mut state = WalkState::default();

        for (position, (line_index, item_id, trails)) in candidates.into_iter().enumerate() {
            if position > self.trail_length as usize {
                tracing::debug!(trigger = %trigger, position, "trail search length reached");
                return None;
            }

            state.levels.absorb(&trails);
            let next = state.levels.peek();
            if position > 1 && next > self.trail_records {
                tracing::debug!(trigger = %trigger, position, next, "trail level limit reached");
                return None;
            }

            if position > 0
                && !state.unlinked.contains(&item_id)
                && self.is_linked(trigger, trigger_body, &item_id).await
            {
                let level = if position == 1 { ADJACENT_LEVEL } else { next };
                self.record(log, &state.walked[1..], level);
                tracing::debug!(
                    trigger = %trigger,
                    linked = %item_id,
                    position,
                    level,
                    "trail linked"
                );
                return Some(TrailLink {
                    item_id,
                    position,
                    line_index,
                    level,
                });
            }

            if position > 0 {
                state.unlinked.insert(item_id);
            }
            state.walked.push(line_index);
        }

        None
    }

    async fn is_linked(&self, trigger: &ItemId, trigger_body: &str, candidate: &ItemId) -> bool {
        if trigger == candidate {
            return self.policy.self_linked();
        }

        let doc = match self.store.fetch_document(candidate, DocumentFields::BODY).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    candidate = %candidate,
                    "Trail candidate unavailable, treating as unlinked"
                );
                return false;
            }
        };

        let candidate_body = doc.body.as_deref().unwrap_or_default();
        self.policy
            .links(trigger, trigger_body, candidate, candidate_body)
    }

    fn record(&self, log: &mut HistoryLog, between: &[usize], level: TrailLevel) {
        if level < FIRST_TRAIL_LEVEL {
            return;
        }
        for &index in between {
            if let Some(line) = log.line_mut(index) {
                line.update_entry(self.format, |entry| {
                    entry.trails.insert(level);
                });
            }
        }
    }
}
