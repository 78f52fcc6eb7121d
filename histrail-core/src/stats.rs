//! Frequently visited items.

use crate::{FreqScope, HistoryLog, ItemId, Timestamp};
use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Visit count for one item within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequentItem {
    pub item_id: ItemId,
    /// Most recent title seen for the item
    pub title: String,
    pub count: usize,
    pub last_visit: Timestamp,
}

/// Whether `ts` falls within `scope` relative to `now`.
pub fn in_scope(scope: FreqScope, now: Timestamp, ts: Timestamp) -> bool {
    match scope {
        FreqScope::Today => ts.date_naive() == now.date_naive(),
        FreqScope::Week => now.signed_duration_since(ts) <= Duration::days(7),
        FreqScope::Month => ts.year() == now.year() && ts.month() == now.month(),
        FreqScope::Year => ts.year() == now.year(),
        FreqScope::All => true,
    }
}

/// Top `limit` items by visit count within `scope`, most visited first.
/// Ties go to the most recently visited item.
pub fn frequent_items(
    log: &HistoryLog,
    now: Timestamp,
    scope: FreqScope,
    limit: usize,
) -> Vec<FrequentItem> {
    let mut counts: HashMap<&ItemId, FrequentItem> = HashMap::new();

    // Newest first, so the first sighting carries the latest title.
    for (_, entry) in log.entries() {
        if !in_scope(scope, now, entry.timestamp) {
            continue;
        }
        counts
            .entry(&entry.item_id)
            .and_modify(|item| {
                item.count += 1;
                if entry.timestamp > item.last_visit {
                    item.last_visit = entry.timestamp;
                    item.title = entry.title.clone();
                }
            })
            .or_insert_with(|| FrequentItem {
                item_id: entry.item_id.clone(),
                title: entry.title.clone(),
                count: 1,
                last_visit: entry.timestamp,
            });
    }

    let mut items: Vec<FrequentItem> = counts.into_values().collect();
    items.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.last_visit.cmp(&a.last_visit))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    items.truncate(limit);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap()
    }

    fn sample() -> HistoryLog {
        HistoryLog::parse(
            &[
                "2024-06-20T11:00:00.000Z [A renamed](:/a)",
                "2024-06-20T10:00:00.000Z [B](:/b)",
                "2024-06-20T09:00:00.000Z [A](:/a)",
                "not a line",
                "2024-06-18T09:00:00.000Z [C](:/c)",
                "2024-06-17T09:00:00.000Z [C](:/c)",
                "2024-06-16T09:00:00.000Z [C](:/c)",
                "2024-01-02T09:00:00.000Z [D](:/d)",
            ]
            .join("\n"),
        )
    }

    fn ids(items: &[FrequentItem]) -> Vec<(&str, usize)> {
        items
            .iter()
            .map(|i| (i.item_id.as_str(), i.count))
            .collect()
    }

    #[test]
    fn test_today_scope() {
        let items = frequent_items(&sample(), now(), FreqScope::Today, 10);
        assert_eq!(ids(&items), vec![("a", 2), ("b", 1)]);
        assert_eq!(items[0].title, "A renamed");
    }

    #[test]
    fn test_week_scope_orders_by_count() {
        let items = frequent_items(&sample(), now(), FreqScope::Week, 10);
        assert_eq!(ids(&items), vec![("c", 3), ("a", 2), ("b", 1)]);
    }

    #[test]
    fn test_all_scope_with_limit() {
        let items = frequent_items(&sample(), now(), FreqScope::All, 2);
        assert_eq!(ids(&items), vec![("c", 3), ("a", 2)]);
    }

    #[test]
    fn test_year_scope_includes_january() {
        let items = frequent_items(&sample(), now(), FreqScope::Year, 10);
        assert!(items.iter().any(|i| i.item_id.as_str() == "d"));
        let month = frequent_items(&sample(), now(), FreqScope::Month, 10);
        assert!(!month.iter().any(|i| i.item_id.as_str() == "d"));
    }

    #[test]
    fn test_zero_limit() {
        assert!(frequent_items(&sample(), now(), FreqScope::All, 0).is_empty());
    }
}
