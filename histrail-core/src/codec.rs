//! Entry codec: one `LogEntry` <-> one line of text.
//!
//! Line grammar (newest entry first in the log):
//!
//! ```text
//! <24-char ISO-8601 instant>[ {L1,L2,...}] [<title>](:/<itemId>)[ {L1,L2,...}]
//! ```
//!
//! The brace block is written before or after the link token depending on
//! [`TrailFormat`]; the parser accepts either placement. It is searched
//! outside the link token, so a title containing braces never shadows it.

use crate::{sanitize_title, CodecError, ItemId, LogEntry, Timestamp, TrailLevel, TrailLevels};
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Width of the leading timestamp slice.
pub const TIMESTAMP_WIDTH: usize = 24;

static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?P<title>[^\[]+)\]\(:/(?P<id>[^)\s]+)\)").expect("Invalid link regex")
});

static TRAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(?P<levels>[^{}]*)\}").expect("Invalid trail regex"));

/// Where the trail block is rendered relative to the link token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailFormat {
    /// `<ts> {2,3} [title](:/id)`
    #[default]
    BeforeTitle,
    /// `<ts> [title](:/id) {2,3}`
    AfterTitle,
}

/// Render a timestamp as the fixed-width instant used by the log.
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse the fixed-width timestamp prefix of a line.
pub fn parse_timestamp(line: &str) -> Result<Timestamp, CodecError> {
    let slice = line
        .get(..TIMESTAMP_WIDTH)
        .ok_or_else(|| CodecError::InvalidTimestamp {
            slice: line.chars().take(TIMESTAMP_WIDTH).collect(),
        })?;
    DateTime::parse_from_rfc3339(slice)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| CodecError::InvalidTimestamp {
            slice: slice.to_string(),
        })
}

/// Render an entry as one log line. The title goes through
/// [`sanitize_title`], so a title mutated in place still yields one line.
pub fn format_entry(entry: &LogEntry, format: TrailFormat) -> String {
    let ts = format_timestamp(entry.timestamp);
    let link = format!(
        "[{}]({})",
        sanitize_title(&entry.title),
        entry.item_id.link_target()
    );

    if entry.trails.is_empty() {
        return format!("{ts} {link}");
    }

    let trail = format_trails(&entry.trails);
    match format {
        TrailFormat::BeforeTitle => format!("{ts} {trail} {link}"),
        TrailFormat::AfterTitle => format!("{ts} {link} {trail}"),
    }
}

fn format_trails(trails: &TrailLevels) -> String {
    let joined = trails
        .iter()
        .map(TrailLevel::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{joined}}}")
}

/// Parse one log line.
///
/// Fails when the timestamp prefix is not a valid instant, when no link
/// token follows it, or when the trail block is not a list of positive
/// integers.
pub fn parse_entry(line: &str) -> Result<LogEntry, CodecError> {
    let timestamp = parse_timestamp(line)?;
    // parse_timestamp already proved TIMESTAMP_WIDTH is a char boundary.
    let rest = &line[TIMESTAMP_WIDTH..];

    let link = LINK_PATTERN
        .captures(rest)
        .ok_or(CodecError::MissingItemLink)?;
    let (title, id, span) = match (link.name("title"), link.name("id"), link.get(0)) {
        (Some(title), Some(id), Some(span)) => (title.as_str(), id.as_str(), span),
        _ => return Err(CodecError::MissingItemLink),
    };

    let before = &rest[..span.start()];
    let after = &rest[span.end()..];
    let trails = match TRAIL_PATTERN
        .captures(before)
        .or_else(|| TRAIL_PATTERN.captures(after))
        .and_then(|caps| caps.name("levels"))
    {
        Some(levels) => parse_trails(levels.as_str())?,
        None => TrailLevels::new(),
    };

    Ok(LogEntry {
        timestamp,
        item_id: ItemId::new(id),
        title: title.to_string(),
        trails,
    })
}

fn parse_trails(token: &str) -> Result<TrailLevels, CodecError> {
    let invalid = || CodecError::InvalidTrailLevel {
        token: token.to_string(),
    };
    let mut levels = TrailLevels::new();
    for part in token.split(',') {
        let level: TrailLevel = part.trim().parse().map_err(|_| invalid())?;
        if level == 0 {
            return Err(invalid());
        }
        levels.insert(level);
    }
    Ok(levels)
}
