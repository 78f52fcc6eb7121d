//! History entry record

use crate::{ItemId, Timestamp, TrailLevel, FIRST_TRAIL_LEVEL};
use chrono::SubsecRound;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of trail levels attached to one entry. Kept sorted so the textual
/// encoding is deterministic.
pub type TrailLevels = BTreeSet<TrailLevel>;

/// One visited-item record: one line of the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Instant of the visit, millisecond precision
    pub timestamp: Timestamp,
    /// Visited item
    pub item_id: ItemId,
    /// Display label at write time (may be the untitled placeholder)
    pub title: String,
    /// Trail levels passing through this entry
    pub trails: TrailLevels,
}

impl LogEntry {
    /// Create an entry with no trails. The timestamp is truncated to the
    /// millisecond precision of the line format.
    pub fn new(timestamp: Timestamp, item_id: ItemId, title: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(3),
            item_id,
            title: sanitize_title(&title.into()),
            trails: TrailLevels::new(),
        }
    }

    /// Replace the trail set.
    pub fn with_trails(mut self, trails: impl IntoIterator<Item = TrailLevel>) -> Self {
        self.trails = trails.into_iter().collect();
        self
    }

    /// Replace the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = sanitize_title(&title.into());
        self
    }

    /// Whether this entry carries `level`.
    pub fn has_trail(&self, level: TrailLevel) -> bool {
        self.trails.contains(&level)
    }

    /// Lowest trail level that is a real (persisted) trail, if any.
    pub fn lowest_recorded_trail(&self) -> Option<TrailLevel> {
        self.trails.range(FIRST_TRAIL_LEVEL..).next().copied()
    }

    /// Whether both entries were written on the same UTC calendar day.
    pub fn same_day_as(&self, other: Timestamp) -> bool {
        self.timestamp.date_naive() == other.date_naive()
    }
}

/// Make a host title fit on one log line.
///
/// Line breaks become single spaces and square brackets are dropped, since
/// the link token can carry neither. May return an empty string.
pub fn sanitize_title(title: &str) -> String {
    title
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['[', ']'], "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn test_new_truncates_to_millis() {
        let ts = Utc
            .with_ymd_and_hms(2024, 1, 1, 10, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let entry = LogEntry::new(ts, ItemId::new("a"), "A");
        assert_eq!(entry.timestamp.nanosecond(), 123_000_000);
    }

    #[test]
    fn test_lowest_recorded_trail_skips_adjacent_level() {
        let entry = LogEntry::new(Utc::now(), ItemId::new("a"), "A").with_trails([1, 4, 3]);
        assert_eq!(entry.lowest_recorded_trail(), Some(3));

        let bare = LogEntry::new(Utc::now(), ItemId::new("a"), "A").with_trails([1]);
        assert_eq!(bare.lowest_recorded_trail(), None);
    }

    #[test]
    fn test_same_day_as() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 1).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap();
        let entry = LogEntry::new(morning, ItemId::new("a"), "A");
        assert!(entry.same_day_as(night));
        assert!(!entry.same_day_as(next));
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Plain title"), "Plain title");
        assert_eq!(sanitize_title("Line1\nLine2"), "Line1 Line2");
        assert_eq!(sanitize_title("Line1\r\nLine2\n"), "Line1 Line2");
        assert_eq!(sanitize_title("[WIP] Plan"), "WIP Plan");
        assert_eq!(sanitize_title("a](:/x) b"), "a(:/x) b");
        assert_eq!(sanitize_title("[]\n"), "");
    }

    #[test]
    fn test_constructors_sanitize_title() {
        let entry = LogEntry::new(Utc::now(), ItemId::new("a"), "[WIP]\nPlan");
        assert_eq!(entry.title, "WIP Plan");
        assert_eq!(entry.with_title("x\ry").title, "x y");
    }
}
