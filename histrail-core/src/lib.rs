//! histrail Core - History Log Model
//!
//! Pure, synchronous building blocks of the visited-items log:
//! - the entry record and its one-line text codec
//! - the line-oriented log model that keeps malformed lines verbatim
//! - trail level allocation
//! - retention (recency suppression, age pruning)
//! - read-path helpers (trail plot replay, day sections, frequent items)
//!
//! Nothing in this crate performs I/O. Document access lives behind the
//! ports in `histrail-storage`; the visit pipeline lives in `histrail-log`.

pub mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod identity;
pub mod level;
pub mod log;
pub mod plot;
pub mod retention;
pub mod sections;
pub mod stats;

pub use codec::{format_entry, format_timestamp, parse_entry, parse_timestamp, TrailFormat};
pub use config::{FreqScope, HistConfig, SelfLinkPolicy};
pub use entry::{sanitize_title, LogEntry, TrailLevels};
pub use error::{CodecError, ConfigError, HistError, HistResult, QueueError, StorageError};
pub use identity::{ItemId, Timestamp, TrailLevel, ADJACENT_LEVEL, FIRST_TRAIL_LEVEL};
pub use level::{next_level, LevelAllocator};
pub use log::{HistoryLog, LogLine};
pub use plot::{colour_index, PlotRow, TrailPlot, TrailSegment};
pub use retention::{prune_old, suppress_recent, RetentionPolicy, RetentionReport};
pub use sections::{day_section, group_by_section, DaySection, SectionGroup};
pub use stats::{frequent_items, in_scope, FrequentItem};
