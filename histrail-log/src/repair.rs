//! Title repair for the newest entry.
//!
//! An item can be visited before its title is available, in which case the
//! entry is written with the placeholder. The next visit retries the title.

use histrail_core::{sanitize_title, HistoryLog, TrailFormat};
use histrail_storage::{DocumentFields, DocumentStore};

/// Replace a placeholder title on the first line with the item's current
/// title. Returns whether the line was rewritten.
///
/// Only a parsed first line is considered. Fetch failures and empty titles
/// leave the placeholder in place.
pub async fn repair_head_title(
    log: &mut HistoryLog,
    store: &dyn DocumentStore,
    placeholder: &str,
    format: TrailFormat,
) -> bool {
    let Some(head) = log.head() else {
        return false;
    };
    if head.title != placeholder {
        return false;
    }
    let item_id = head.item_id.clone();

    let title = match store.fetch_document(&item_id, DocumentFields::TITLE).await {
        Ok(doc) => sanitize_title(doc.title.as_deref().unwrap_or_default()),
        Err(e) => {
            tracing::warn!(error = %e, item = %item_id, "Title repair fetch failed");
            return false;
        }
    };
    if title.is_empty() || title == placeholder {
        return false;
    }

    tracing::debug!(item = %item_id, title = %title, "placeholder title repaired");
    log.line_mut(0)
        .map(|line| line.update_entry(format, |entry| entry.title = title))
        .unwrap_or(false)
}
