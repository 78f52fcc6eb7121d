//! histrail Test Utilities
//!
//! Shared helpers for histrail tests:
//! - proptest generators for entries, logs and configurations
//! - fixtures: a fixed clock, log body builders, linked document graphs
//! - assertions on `HistResult`
//! - opt-in tracing output for tests

use chrono::{Duration, TimeZone, Utc};
use histrail_core::{
    format_entry, HistConfig, HistError, HistResult, HistoryLog, ItemId, LogEntry, StorageError,
    Timestamp, TrailFormat, TrailLevel,
};
use histrail_storage::{Document, MockDocumentStore};
use std::collections::BTreeMap;

// ============================================================================
// TRACING
// ============================================================================

/// Install a test subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for histrail types.

    use super::*;
    use proptest::prelude::*;

    /// Generate an item id (lowercase hex, like host document ids).
    pub fn arb_item_id() -> impl Strategy<Value = ItemId> {
        "[0-9a-f]{8}".prop_map(ItemId::new)
    }

    /// Generate a millisecond-precision timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800_000i64..1_893_456_000_000i64)
            .prop_map(|millis| Utc.timestamp_millis_opt(millis).unwrap())
    }

    /// Generate a non-empty title without brackets or line breaks.
    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 ,.!?{}()_-]{0,30}"
    }

    /// Generate a set of recordable trail levels.
    pub fn arb_trail_levels() -> impl Strategy<Value = Vec<TrailLevel>> {
        prop::collection::btree_set(2u32..12, 0..4).prop_map(|set| set.into_iter().collect())
    }

    /// Generate a trail placement.
    pub fn arb_trail_format() -> impl Strategy<Value = TrailFormat> {
        prop_oneof![Just(TrailFormat::BeforeTitle), Just(TrailFormat::AfterTitle)]
    }

    /// Generate a log entry.
    pub fn arb_entry() -> impl Strategy<Value = LogEntry> {
        (arb_timestamp(), arb_item_id(), arb_title(), arb_trail_levels()).prop_map(
            |(ts, id, title, trails)| LogEntry::new(ts, id, title).with_trails(trails),
        )
    }

    /// Generate a line that does not parse as an entry.
    pub fn arb_garbage_line() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[a-z ]{1,20}",
            "not-a-date-at-all-xxxxx [T](:/[0-9a-f]{4})",
        ]
    }

    /// Generate a newest-first log ending at `now`.
    ///
    /// Entries are spaced by random gaps going back in time, with an
    /// occasional malformed line mixed in.
    pub fn arb_log(now: Timestamp) -> impl Strategy<Value = HistoryLog> {
        prop::collection::vec(
            (
                0i64..86_400,
                prop_oneof![
                    9 => (arb_item_id(), arb_title(), arb_trail_levels()).prop_map(Some),
                    1 => Just(None),
                ],
                arb_garbage_line(),
            ),
            0..24,
        )
        .prop_map(move |rows| {
            let mut ts = now;
            let mut lines = Vec::with_capacity(rows.len());
            for (gap, entry, garbage) in rows {
                ts -= Duration::seconds(gap);
                match entry {
                    Some((id, title, trails)) => lines.push(format_entry(
                        &LogEntry::new(ts, id, title).with_trails(trails),
                        TrailFormat::BeforeTitle,
                    )),
                    None => lines.push(garbage),
                }
            }
            HistoryLog::parse(&lines.join("\n"))
        })
    }

    /// Generate a configuration that passes validation.
    pub fn arb_valid_config() -> impl Strategy<Value = HistConfig> {
        (
            0i64..600,
            0i64..365,
            0u32..=10,
            0u32..=100,
            any::<bool>(),
            arb_trail_format(),
        )
            .prop_map(
                |(sec_between_items, max_days, trail_records, trail_length, backlinks, format)| {
                    HistConfig {
                        sec_between_items,
                        max_days,
                        trail_records,
                        trail_length,
                        trail_backlinks: backlinks,
                        trail_format: format,
                        ..HistConfig::for_log("log")
                    }
                },
            )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common scenarios.

    use super::*;

    /// Id of the log document used by the fixtures.
    pub const LOG_ID: &str = "log";

    /// Fixed clock: 2024-01-01T12:00:00Z.
    pub fn fixed_now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    /// Configuration logging into [`LOG_ID`] with retention disabled.
    pub fn quiet_config() -> HistConfig {
        HistConfig {
            sec_between_items: 0,
            max_days: 0,
            trail_records: 6,
            trail_length: 10,
            ..HistConfig::for_log(LOG_ID)
        }
    }

    /// Builds a log body newest first, relative to a clock.
    #[derive(Debug, Clone)]
    pub struct LogBuilder {
        now: Timestamp,
        format: TrailFormat,
        lines: Vec<String>,
    }

    impl LogBuilder {
        /// Builder anchored at `now`.
        pub fn new(now: Timestamp) -> Self {
            Self {
                now,
                format: TrailFormat::BeforeTitle,
                lines: Vec::new(),
            }
        }

        /// Trail placement for the following entries.
        pub fn format(mut self, format: TrailFormat) -> Self {
            self.format = format;
            self
        }

        /// Append an entry visited `age` before now.
        pub fn visit(self, age: Duration, id: &str, title: &str) -> Self {
            self.visit_with_trails(age, id, title, &[])
        }

        /// Append an entry carrying trail levels.
        pub fn visit_with_trails(
            mut self,
            age: Duration,
            id: &str,
            title: &str,
            trails: &[TrailLevel],
        ) -> Self {
            let entry = LogEntry::new(self.now - age, ItemId::new(id), title)
                .with_trails(trails.iter().copied());
            self.lines.push(format_entry(&entry, self.format));
            self
        }

        /// Append a raw line verbatim.
        pub fn raw(mut self, line: &str) -> Self {
            self.lines.push(line.to_string());
            self
        }

        /// The document body.
        pub fn body(&self) -> String {
            self.lines.join("\n")
        }

        /// The parsed log.
        pub fn log(&self) -> HistoryLog {
            HistoryLog::parse(&self.body())
        }
    }

    /// Builds a document store whose bodies link items to each other.
    #[derive(Debug, Clone, Default)]
    pub struct DocumentGraph {
        items: BTreeMap<ItemId, (String, String)>,
    }

    impl DocumentGraph {
        /// Empty graph.
        pub fn new() -> Self {
            Self::default()
        }

        /// Add an item with a title and an empty body.
        pub fn item(mut self, id: &str, title: &str) -> Self {
            self.items
                .insert(ItemId::new(id), (title.to_string(), String::new()));
            self
        }

        /// Make `from`'s body reference `to`. Adds `from` if missing.
        pub fn link(mut self, from: &str, to: &str) -> Self {
            let to = ItemId::new(to);
            let (_, body) = self
                .items
                .entry(ItemId::new(from))
                .or_insert_with(|| (from.to_uppercase(), String::new()));
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(&format!("[{}]({})", to.as_str().to_uppercase(), to.link_target()));
            self
        }

        /// Build the store, adding the log document with `log_body`.
        pub fn build_with_log(self, log_body: &str) -> HistResult<MockDocumentStore> {
            let store = MockDocumentStore::new().with_document(LOG_ID, "History", log_body)?;
            for (id, (title, body)) in self.items {
                store.insert(Document::new(id, title, body))?;
            }
            Ok(store)
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on histrail results.

    use super::*;

    /// Assert that a HistResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &HistResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a HistResult is a NotFound storage error.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &HistResult<T>) {
        match result {
            Err(HistError::Storage(StorageError::NotFound { .. })) => {}
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    /// Assert that a HistResult is a failed write.
    #[track_caller]
    pub fn assert_write_failed<T: std::fmt::Debug>(result: &HistResult<T>) {
        match result {
            Err(HistError::Storage(StorageError::WriteFailed { .. })) => {}
            other => panic!("Expected WriteFailed error, got: {:?}", other),
        }
    }

    /// Assert that a HistResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &HistResult<T>) {
        match result {
            Err(HistError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert the trail levels recorded on line `index` of `body`.
    #[track_caller]
    pub fn assert_trails(body: &str, index: usize, expected: &[TrailLevel]) {
        let log = HistoryLog::parse(body);
        let entry = log
            .line(index)
            .and_then(|line| line.entry())
            .unwrap_or_else(|| panic!("line {index} is not an entry in:\n{body}"));
        let actual: Vec<TrailLevel> = entry.trails.iter().copied().collect();
        assert_eq!(actual, expected, "trail levels of line {index} in:\n{body}");
    }
}
