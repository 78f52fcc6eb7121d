//! Day sections used to fold the history panel.

use crate::{HistoryLog, Timestamp};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Folding section an entry belongs to, relative to "now" (UTC days).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DaySection {
    Today,
    Yesterday,
    /// Two to seven days ago
    LastSevenDays,
    /// Older than a week, same calendar month as now
    ThisMonth,
    /// Older than a week, another month
    Month { year: i32, month: u32 },
}

impl DaySection {
    /// Panel label.
    pub fn label(&self) -> String {
        match self {
            DaySection::Today => "Today".to_string(),
            DaySection::Yesterday => "Yesterday".to_string(),
            DaySection::LastSevenDays => "Last 7 days".to_string(),
            DaySection::ThisMonth => "This month".to_string(),
            DaySection::Month { year, month } => {
                let name = chrono::Month::try_from(*month as u8)
                    .map(|m| m.name().get(..3).unwrap_or(m.name()).to_string())
                    .unwrap_or_else(|_| month.to_string());
                format!("{name} {year}")
            }
        }
    }
}

/// Classify an entry timestamp.
pub fn day_section(now: Timestamp, ts: Timestamp) -> DaySection {
    let days = (now.date_naive() - ts.date_naive()).num_days();
    match days {
        i64::MIN..=0 => DaySection::Today,
        1 => DaySection::Yesterday,
        2..=7 => DaySection::LastSevenDays,
        _ if ts.year() == now.year() && ts.month() == now.month() => DaySection::ThisMonth,
        _ => DaySection::Month {
            year: ts.year(),
            month: ts.month(),
        },
    }
}

/// Consecutive run of log lines under one section header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionGroup {
    pub section: DaySection,
    pub line_indices: Vec<usize>,
}

/// Group the parsed entries of `log` into sections, in log order.
///
/// A header opens the first time its section is seen; an entry whose section
/// was already opened earlier stays in the currently open group.
pub fn group_by_section(log: &HistoryLog, now: Timestamp) -> Vec<SectionGroup> {
    let mut groups: Vec<SectionGroup> = Vec::new();
    let mut seen: HashSet<DaySection> = HashSet::new();

    for (index, entry) in log.entries() {
        let section = day_section(now, entry.timestamp);
        if seen.insert(section) {
            groups.push(SectionGroup {
                section,
                line_indices: vec![index],
            });
        } else if let Some(open) = groups.last_mut() {
            open.line_indices.push(index);
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 20, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_day_section_boundaries() {
        assert_eq!(day_section(now(), now()), DaySection::Today);
        assert_eq!(
            day_section(now(), now() + Duration::hours(1)),
            DaySection::Today
        );
        assert_eq!(
            day_section(now(), now() - Duration::hours(10)),
            DaySection::Yesterday
        );
        assert_eq!(
            day_section(now(), now() - Duration::days(7)),
            DaySection::LastSevenDays
        );
        assert_eq!(
            day_section(now(), now() - Duration::days(8)),
            DaySection::ThisMonth
        );
        assert_eq!(
            day_section(now(), now() - Duration::days(30)),
            DaySection::Month {
                year: 2024,
                month: 5
            }
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(DaySection::LastSevenDays.label(), "Last 7 days");
        assert_eq!(
            DaySection::Month {
                year: 2023,
                month: 12
            }
            .label(),
            "Dec 2023"
        );
    }

    #[test]
    fn test_group_by_section() {
        let body = [
            "2024-06-20T08:00:00.000Z [A](:/a)",
            "2024-06-20T07:00:00.000Z [B](:/b)",
            "junk",
            "2024-06-19T07:00:00.000Z [C](:/c)",
            "2024-05-01T07:00:00.000Z [D](:/d)",
            "2024-06-20T01:00:00.000Z [E](:/e)",
        ]
        .join("\n");
        let groups = group_by_section(&HistoryLog::parse(&body), now());
        let summary: Vec<_> = groups
            .iter()
            .map(|g| (g.section, g.line_indices.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (DaySection::Today, vec![0, 1]),
                (DaySection::Yesterday, vec![3]),
                (
                    DaySection::Month {
                        year: 2024,
                        month: 5
                    },
                    vec![4, 5]
                ),
            ]
        );
    }
}
