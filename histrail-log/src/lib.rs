//! histrail Log - Visit Pipeline
//!
//! Records item visits into a history log document:
//! - `logger`: the per-visit pipeline (skip checks, retention, title repair,
//!   prepend, trail walk, persist)
//! - `annotator`: the backward trail walk that links a visit to an older entry
//! - `linkage`: the content linkage rule used by the walk
//! - `repair`: placeholder title repair
//! - `queue`: serialized processing of visit notifications

pub mod annotator;
pub mod linkage;
pub mod logger;
pub mod queue;
pub mod repair;

pub use annotator::{TrailAnnotator, TrailLink};
pub use linkage::LinkPolicy;
pub use logger::{HistoryLogger, SkipReason, VisitOutcome};
pub use queue::{QueueStats, VisitEvent, VisitQueue, DEFAULT_QUEUE_CAPACITY};
pub use repair::repair_head_title;
