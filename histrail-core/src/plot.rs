//! Trail plot replay for the render read path.
//!
//! Walks the parsed entries from the oldest to the newest and runs a small
//! state machine per trail level:
//!
//! ```text
//! absent  -> present : Starts     (curve in from the linked entry below)
//! present -> present : Continues  (straight segment)
//! present -> absent  : Ends       (on the last present entry, curve out to the trigger)
//! ```
//!
//! The presentation layer owns the shapes; this module only decides which
//! segment each entry shows for each displayed level.

use crate::{HistoryLog, TrailLevel, TrailLevels, FIRST_TRAIL_LEVEL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Segment drawn for one level beside one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailSegment {
    /// Oldest entry of a run
    Starts,
    /// Inside a run
    Continues,
    /// Newest entry of a run
    Ends,
    /// Run of a single entry
    StartsAndEnds,
}

impl TrailSegment {
    fn close(self) -> Self {
        match self {
            TrailSegment::Starts | TrailSegment::StartsAndEnds => TrailSegment::StartsAndEnds,
            TrailSegment::Continues | TrailSegment::Ends => TrailSegment::Ends,
        }
    }
}

/// Segments for one log line. Opaque lines get an empty row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotRow {
    /// Index of the line in the log
    pub line_index: usize,
    /// Segment per displayed level
    pub segments: BTreeMap<TrailLevel, TrailSegment>,
}

/// Plot of every displayed trail level across the log, newest line first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailPlot {
    rows: Vec<PlotRow>,
}

impl TrailPlot {
    /// Replay the trails of `log`, keeping levels `2..=trail_display + 1`.
    pub fn build(log: &HistoryLog, trail_display: u32) -> Self {
        let mut rows: Vec<PlotRow> = (0..log.len())
            .map(|line_index| PlotRow {
                line_index,
                segments: BTreeMap::new(),
            })
            .collect();
        if trail_display == 0 {
            return Self { rows };
        }

        let max_level = FIRST_TRAIL_LEVEL.saturating_add(trail_display - 1);
        let entries: Vec<(usize, TrailLevels)> = log
            .entries()
            .map(|(index, entry)| {
                let shown = entry
                    .trails
                    .range(FIRST_TRAIL_LEVEL..=max_level)
                    .copied()
                    .collect();
                (index, shown)
            })
            .collect();

        let mut open = TrailLevels::new();
        let mut previous: Option<usize> = None;

        for (index, levels) in entries.iter().rev() {
            if let Some(prev) = previous {
                for level in open.difference(levels) {
                    close_segment(&mut rows[prev], *level);
                }
            }
            for &level in levels {
                let segment = if open.contains(&level) {
                    TrailSegment::Continues
                } else {
                    TrailSegment::Starts
                };
                rows[*index].segments.insert(level, segment);
            }
            open = levels.clone();
            previous = Some(*index);
        }

        if let Some(prev) = previous {
            for level in &open {
                close_segment(&mut rows[prev], *level);
            }
        }

        Self { rows }
    }

    /// All rows, newest line first.
    pub fn rows(&self) -> &[PlotRow] {
        &self.rows
    }

    /// Row for the line at `line_index`.
    pub fn row(&self, line_index: usize) -> Option<&PlotRow> {
        self.rows.get(line_index)
    }

    /// Segment for `level` beside the line at `line_index`.
    pub fn segment(&self, line_index: usize, level: TrailLevel) -> Option<TrailSegment> {
        self.row(line_index)
            .and_then(|row| row.segments.get(&level))
            .copied()
    }
}

fn close_segment(row: &mut PlotRow, level: TrailLevel) {
    if let Some(segment) = row.segments.get_mut(&level) {
        *segment = segment.close();
    }
}

/// Colour slot for a level in a palette of `palette_len` colours.
pub fn colour_index(level: TrailLevel, palette_len: usize) -> Option<usize> {
    if palette_len == 0 || level < FIRST_TRAIL_LEVEL {
        return None;
    }
    Some((level - FIRST_TRAIL_LEVEL) as usize % palette_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(trails: &[&str]) -> HistoryLog {
        let body = trails
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if *t == "junk" {
                    "junk".to_string()
                } else if t.is_empty() {
                    format!("2024-01-01T10:{:02}:00.000Z [N{i}](:/n{i})", 59 - i)
                } else {
                    format!("2024-01-01T10:{:02}:00.000Z [N{i}](:/n{i}) {{{t}}}", 59 - i)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        HistoryLog::parse(&body)
    }

    #[test]
    fn test_single_intermediate_entry() {
        // c -> [b] -> a : b carries level 2 alone
        let plot = TrailPlot::build(&log(&["", "2", ""]), 3);
        assert_eq!(plot.segment(1, 2), Some(TrailSegment::StartsAndEnds));
        assert_eq!(plot.segment(0, 2), None);
        assert_eq!(plot.segment(2, 2), None);
    }

    #[test]
    fn test_run_start_continue_end() {
        let plot = TrailPlot::build(&log(&["", "2", "2", "2", ""]), 3);
        assert_eq!(plot.segment(3, 2), Some(TrailSegment::Starts));
        assert_eq!(plot.segment(2, 2), Some(TrailSegment::Continues));
        assert_eq!(plot.segment(1, 2), Some(TrailSegment::Ends));
    }

    #[test]
    fn test_run_ending_at_newest_line() {
        let plot = TrailPlot::build(&log(&["2", "2"]), 3);
        assert_eq!(plot.segment(1, 2), Some(TrailSegment::Starts));
        assert_eq!(plot.segment(0, 2), Some(TrailSegment::Ends));
    }

    #[test]
    fn test_reused_level_forms_separate_runs() {
        let plot = TrailPlot::build(&log(&["", "2", "", "2", "2"]), 3);
        assert_eq!(plot.segment(1, 2), Some(TrailSegment::StartsAndEnds));
        assert_eq!(plot.segment(3, 2), Some(TrailSegment::Ends));
        assert_eq!(plot.segment(4, 2), Some(TrailSegment::Starts));
    }

    #[test]
    fn test_opaque_lines_are_skipped() {
        let plot = TrailPlot::build(&log(&["2", "junk", "2"]), 3);
        assert!(plot.row(1).map(|r| r.segments.is_empty()).unwrap_or(false));
        assert_eq!(plot.segment(2, 2), Some(TrailSegment::Starts));
        assert_eq!(plot.segment(0, 2), Some(TrailSegment::Ends));
    }

    #[test]
    fn test_display_limit() {
        let plot = TrailPlot::build(&log(&["2,3,4", "2,3,4"]), 2);
        let levels: Vec<_> = plot.rows()[0].segments.keys().copied().collect();
        assert_eq!(levels, vec![2, 3]);

        let hidden = TrailPlot::build(&log(&["2", "2"]), 0);
        assert!(hidden.rows().iter().all(|r| r.segments.is_empty()));
        assert_eq!(hidden.rows().len(), 2);
    }

    #[test]
    fn test_colour_index() {
        assert_eq!(colour_index(2, 3), Some(0));
        assert_eq!(colour_index(4, 3), Some(2));
        assert_eq!(colour_index(5, 3), Some(0));
        assert_eq!(colour_index(1, 3), None);
        assert_eq!(colour_index(2, 0), None);
    }
}
