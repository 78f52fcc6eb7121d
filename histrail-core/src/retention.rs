//! Retention engine: recency suppression and age pruning.
//!
//! Both passes run on the newest-first log before a new entry is inserted.
//! A threshold <= 0 disables its pass.

use crate::codec::TrailFormat;
use crate::{HistConfig, HistoryLog, ItemId, LogLine, Timestamp, TrailLevel, TrailLevels};
use chrono::Duration;

/// What a retention run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    /// Item of the newest entry dropped by recency suppression
    pub suppressed: Option<ItemId>,
    /// Trail levels stripped because the suppressed entry anchored them
    pub stripped_levels: Vec<TrailLevel>,
    /// Number of entries removed by age pruning
    pub pruned: usize,
}

impl RetentionReport {
    /// Whether the log was modified.
    pub fn changed(&self) -> bool {
        self.suppressed.is_some() || self.pruned > 0
    }
}

/// Retention thresholds, taken from a configuration snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Minimum seconds between the newest entry and a new visit
    pub sec_between_items: i64,
    /// Maximum age of an entry in days
    pub max_days: i64,
    /// Placement of trail blocks when lines are rewritten
    pub format: TrailFormat,
}

impl RetentionPolicy {
    /// Build from the configuration snapshot.
    pub fn from_config(config: &HistConfig) -> Self {
        Self {
            sec_between_items: config.sec_between_items,
            max_days: config.max_days,
            format: config.trail_format,
        }
    }

    /// Whether recency suppression runs.
    pub fn recency_enabled(&self) -> bool {
        self.sec_between_items > 0
    }

    /// Whether age pruning runs.
    pub fn pruning_enabled(&self) -> bool {
        self.max_days > 0
    }

    /// Run recency suppression, then age pruning.
    pub fn apply(&self, log: &mut HistoryLog, now: Timestamp) -> RetentionReport {
        let mut report = RetentionReport::default();

        if self.recency_enabled() {
            if let Some((item, stripped)) =
                suppress_recent(log, now, self.sec_between_items, self.format)
            {
                report.suppressed = Some(item);
                report.stripped_levels = stripped;
            }
        }

        if self.pruning_enabled() {
            report.pruned = prune_old(log, now, self.max_days);
        }

        report
    }
}

/// Drop the newest entry when it is less than `min_secs` old.
///
/// Rapid re-visits collapse into one entry. Trails anchored by the dropped
/// entry are stripped from the entries below it: its own lowest recorded
/// level (logs that stored a trail on its trigger) and every level that
/// begins on the next entry. Stripping a level stops at the first entry that
/// does not carry it. Returns the dropped item and the stripped levels.
pub fn suppress_recent(
    log: &mut HistoryLog,
    now: Timestamp,
    min_secs: i64,
    format: TrailFormat,
) -> Option<(ItemId, Vec<TrailLevel>)> {
    if min_secs <= 0 {
        return None;
    }
    let head = log.head()?;
    if now.signed_duration_since(head.timestamp) >= Duration::seconds(min_secs) {
        return None;
    }

    let mut anchored: TrailLevels = head.lowest_recorded_trail().into_iter().collect();
    if let Some((_, next)) = log.entries().nth(1) {
        anchored.extend(next.trails.difference(&head.trails).copied());
    }
    anchored.remove(&crate::ADJACENT_LEVEL);

    let dropped = log.pop_front()?;
    let item = dropped.entry()?.item_id.clone();

    for &level in &anchored {
        strip_level(log, level, format);
    }

    Some((item, anchored.into_iter().collect()))
}

fn strip_level(log: &mut HistoryLog, level: TrailLevel, format: TrailFormat) {
    for index in 0..log.len() {
        let Some(line) = log.line_mut(index) else {
            break;
        };
        match line.entry() {
            None => continue,
            Some(entry) if !entry.has_trail(level) => break,
            Some(_) => {
                line.update_entry(format, |entry| {
                    entry.trails.remove(&level);
                });
            }
        }
    }
}

/// Remove entries older than `max_days` from the tail of the log.
///
/// Entries are time-ordered, so the scan stops at the first entry (from the
/// oldest end) inside the window. Opaque lines met in the tail stay in place.
/// Returns how many entries were removed.
pub fn prune_old(log: &mut HistoryLog, now: Timestamp, max_days: i64) -> usize {
    if max_days <= 0 {
        return 0;
    }
    let window = Duration::days(max_days);
    let mut kept_tail: Vec<LogLine> = Vec::new();
    let mut removed = 0;

    while let Some(line) = log.pop_back() {
        match line.entry() {
            None => kept_tail.push(line),
            Some(entry) if now.signed_duration_since(entry.timestamp) <= window => {
                kept_tail.push(line);
                break;
            }
            Some(_) => removed += 1,
        }
    }

    kept_tail.reverse();
    log.extend(kept_tail);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::format_entry;
    use crate::LogEntry;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn line(secs_ago: i64, id: &str, trails: &[TrailLevel]) -> String {
        let entry = LogEntry::new(now() - Duration::seconds(secs_ago), ItemId::new(id), id)
            .with_trails(trails.iter().copied());
        format_entry(&entry, TrailFormat::AfterTitle)
    }

    fn body(lines: &[String]) -> HistoryLog {
        HistoryLog::parse(&lines.join("\n"))
    }

    fn trails_of(log: &HistoryLog) -> Vec<Vec<TrailLevel>> {
        log.entries()
            .map(|(_, e)| e.trails.iter().copied().collect())
            .collect()
    }

    #[test]
    fn test_recent_head_is_dropped() {
        let mut log = body(&[line(30, "a", &[]), line(600, "b", &[])]);
        let dropped = suppress_recent(&mut log, now(), 60, TrailFormat::AfterTitle);
        assert_eq!(dropped.map(|(id, _)| id), Some(ItemId::new("a")));
        assert_eq!(log.len(), 1);
        assert_eq!(log.head().map(|e| e.item_id.as_str()), Some("b"));
    }

    #[test]
    fn test_old_enough_head_is_kept() {
        let mut log = body(&[line(60, "a", &[]), line(600, "b", &[])]);
        assert!(suppress_recent(&mut log, now(), 60, TrailFormat::AfterTitle).is_none());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_opaque_head_is_never_suppressed() {
        let mut log = HistoryLog::parse("");
        assert!(suppress_recent(&mut log, now(), 60, TrailFormat::AfterTitle).is_none());
        assert_eq!(log.render(), "");
    }

    #[test]
    fn test_suppression_strips_trail_started_below_head() {
        // head triggered a trail through b and c towards d
        let mut log = body(&[
            line(10, "a", &[]),
            line(100, "b", &[2]),
            line(200, "c", &[2, 3]),
            line(300, "d", &[3]),
            line(400, "e", &[2]),
        ]);
        let dropped = suppress_recent(&mut log, now(), 60, TrailFormat::AfterTitle);
        assert_eq!(dropped.map(|(_, levels)| levels), Some(vec![2]));
        // stripping stops at d, so the older level-2 trail on e survives
        assert_eq!(trails_of(&log), vec![vec![], vec![3], vec![3], vec![2]]);
    }

    #[test]
    fn test_suppression_strips_legacy_trigger_level() {
        let mut log = body(&[
            line(10, "a", &[2]),
            line(100, "b", &[2]),
            line(200, "c", &[]),
        ]);
        let dropped = suppress_recent(&mut log, now(), 60, TrailFormat::AfterTitle);
        assert_eq!(dropped.map(|(_, levels)| levels), Some(vec![2]));
        assert_eq!(trails_of(&log), vec![Vec::<TrailLevel>::new(), vec![]]);
    }

    #[test]
    fn test_suppression_ignores_adjacent_level() {
        let mut log = body(&[line(10, "a", &[1]), line(100, "b", &[2]), line(200, "c", &[2])]);
        // b's level 2 begins below a, so it is anchored by a
        let dropped = suppress_recent(&mut log, now(), 60, TrailFormat::AfterTitle);
        assert_eq!(dropped.map(|(_, levels)| levels), Some(vec![2]));
        assert_eq!(trails_of(&log), vec![Vec::<TrailLevel>::new(), vec![]]);
    }

    #[test]
    fn test_suppression_treats_head_level_as_its_own_trail() {
        let mut log = body(&[line(10, "a", &[3]), line(100, "b", &[3]), line(200, "c", &[])]);
        let dropped = suppress_recent(&mut log, now(), 60, TrailFormat::AfterTitle);
        assert_eq!(dropped.map(|(_, levels)| levels), Some(vec![3]));
        assert_eq!(trails_of(&log), vec![Vec::<TrailLevel>::new(), vec![]]);
    }

    #[test]
    fn test_strip_passes_over_opaque_lines() {
        let mut log = HistoryLog::parse(&[
            line(10, "a", &[]),
            line(100, "b", &[2]),
            "garbage".to_string(),
            line(200, "c", &[2]),
            line(300, "d", &[]),
        ]
        .join("\n"));
        suppress_recent(&mut log, now(), 60, TrailFormat::AfterTitle);
        assert_eq!(log.line(1).map(LogLine::text), Some("garbage"));
        assert_eq!(trails_of(&log), vec![Vec::<TrailLevel>::new(), vec![], vec![]]);
    }

    #[test]
    fn test_prune_keeps_window() {
        let day = 86_400;
        let mut log = body(&[line(10 * day, "new", &[]), line(100 * day, "old", &[])]);
        assert_eq!(prune_old(&mut log, now(), 90), 1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.head().map(|e| e.item_id.as_str()), Some("new"));
    }

    #[test]
    fn test_prune_boundary_is_inclusive() {
        let day = 86_400;
        let mut log = body(&[line(90 * day, "edge", &[])]);
        assert_eq!(prune_old(&mut log, now(), 90), 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_prune_stops_at_first_entry_in_window() {
        let day = 86_400;
        // out of order: the scan stops at "mid" and never looks at "stale"
        let mut log = body(&[
            line(200 * day, "stale", &[]),
            line(5 * day, "mid", &[]),
            line(120 * day, "old", &[]),
        ]);
        assert_eq!(prune_old(&mut log, now(), 90), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_prune_keeps_opaque_tail_lines() {
        let day = 86_400;
        let mut log = HistoryLog::parse(&format!(
            "{}\n{}\njunk\n",
            line(day, "new", &[]),
            line(100 * day, "old", &[])
        ));
        assert_eq!(prune_old(&mut log, now(), 90), 1);
        assert_eq!(log.render(), format!("{}\njunk\n", line(day, "new", &[])));
    }

    #[test]
    fn test_apply_disabled_thresholds() {
        let mut log = body(&[line(1, "a", &[]), line(1_000 * 86_400, "b", &[])]);
        let policy = RetentionPolicy {
            sec_between_items: 0,
            max_days: -1,
            format: TrailFormat::AfterTitle,
        };
        assert!(!policy.recency_enabled());
        assert!(!policy.pruning_enabled());
        let report = policy.apply(&mut log, now());
        assert!(!report.changed());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_policy_from_config_thresholds() {
        let config = HistConfig {
            sec_between_items: -5,
            max_days: 30,
            ..HistConfig::default()
        };
        let policy = RetentionPolicy::from_config(&config);
        assert!(!policy.recency_enabled());
        assert!(policy.pruning_enabled());
    }

    #[test]
    fn test_apply_runs_both_passes() {
        let mut log = body(&[
            line(30, "a", &[]),
            line(3_600, "b", &[]),
            line(100 * 86_400, "c", &[]),
        ]);
        let policy = RetentionPolicy {
            sec_between_items: 60,
            max_days: 90,
            format: TrailFormat::AfterTitle,
        };
        let report = policy.apply(&mut log, now());
        assert_eq!(report.suppressed, Some(ItemId::new("a")));
        assert_eq!(report.pruned, 1);
        assert_eq!(log.len(), 1);
    }
}
