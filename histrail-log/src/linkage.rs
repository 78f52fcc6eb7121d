//! Content linkage between a visited item and an older log entry.

use histrail_core::{HistConfig, ItemId, SelfLinkPolicy};

/// Decides whether two documents are linked.
///
/// A forward link is the trigger's content referencing the candidate. With
/// backlinks enabled, the candidate referencing the trigger counts as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPolicy {
    pub backlinks: bool,
    pub self_link: SelfLinkPolicy,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            backlinks: true,
            self_link: SelfLinkPolicy::Linked,
        }
    }
}

impl LinkPolicy {
    /// Build from the configuration snapshot.
    pub fn from_config(config: &HistConfig) -> Self {
        Self {
            backlinks: config.trail_backlinks,
            self_link: config.self_link,
        }
    }

    /// Verdict for a candidate carrying the trigger's own id.
    pub fn self_linked(&self) -> bool {
        self.self_link == SelfLinkPolicy::Linked
    }

    /// Whether `trigger` links to `candidate` given both bodies.
    pub fn links(
        &self,
        trigger: &ItemId,
        trigger_body: &str,
        candidate: &ItemId,
        candidate_body: &str,
    ) -> bool {
        if trigger == candidate {
            return self.self_linked();
        }
        candidate.is_referenced_by(trigger_body)
            || (self.backlinks && trigger.is_referenced_by(candidate_body))
    }
}
