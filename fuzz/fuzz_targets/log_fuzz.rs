//! Fuzz test for the line-oriented log passes
//!
//! Treats the input as a whole log document and runs every pass that works
//! on untrusted document text: parse/render, retention, trail plot, day
//! sections and frequent items.
//!
//! Run with: cargo +nightly fuzz run log_fuzz -- -max_total_time=60

#![no_main]

use chrono::{TimeZone, Utc};
use histrail_core::{
    frequent_items, group_by_section, FreqScope, HistoryLog, RetentionPolicy, TrailFormat,
    TrailPlot,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&knob, rest)) = data.split_first() else {
        return;
    };
    let Ok(body) = std::str::from_utf8(rest) else {
        return;
    };
    let Some(now) = Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).single() else {
        return;
    };

    // parse/render is lossless for any text
    let log = HistoryLog::parse(body);
    assert_eq!(log.render(), body);

    let plot = TrailPlot::build(&log, u32::from(knob % 12));
    assert_eq!(plot.rows().len(), log.len());

    let sections = group_by_section(&log, now);
    let grouped: usize = sections.iter().map(|g| g.line_indices.len()).sum();
    assert_eq!(grouped, log.entries().count());

    let top = frequent_items(&log, now, FreqScope::All, usize::from(knob));
    assert!(top.len() <= usize::from(knob));

    let before = log.len();
    let mut retained = log.clone();
    let policy = RetentionPolicy {
        sec_between_items: i64::from(knob),
        max_days: i64::from(knob / 2),
        format: TrailFormat::BeforeTitle,
    };
    let report = policy.apply(&mut retained, now);
    let dropped = usize::from(report.suppressed.is_some()) + report.pruned;
    assert_eq!(retained.len() + dropped, before);
});
