//! Line-oriented history log model.
//!
//! The log is the ordered list of lines of the host document, newest first.
//! Order is the only thing tying entries together. Lines that do not parse
//! are kept verbatim and skipped by every semantic pass.

use crate::codec::{format_entry, parse_entry, TrailFormat};
use crate::LogEntry;

/// One line of the log: its current text and, when it parses, its entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    text: String,
    entry: Option<LogEntry>,
}

impl LogLine {
    /// Parse a line. Never fails: malformed text becomes an opaque line.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let entry = parse_entry(&text).ok();
        Self { text, entry }
    }

    /// Render an entry into a new line.
    pub fn from_entry(entry: LogEntry, format: TrailFormat) -> Self {
        Self {
            text: format_entry(&entry, format),
            entry: Some(entry),
        }
    }

    /// Current text of the line.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed entry, `None` for opaque lines.
    pub fn entry(&self) -> Option<&LogEntry> {
        self.entry.as_ref()
    }

    /// Whether the line failed to parse.
    pub fn is_opaque(&self) -> bool {
        self.entry.is_none()
    }

    /// Replace the entry and re-render the text.
    pub fn set_entry(&mut self, entry: LogEntry, format: TrailFormat) {
        self.text = format_entry(&entry, format);
        self.entry = Some(entry);
    }

    /// Apply `edit` to the parsed entry and re-render. Opaque lines are left
    /// untouched. Returns whether the line was rewritten.
    pub fn update_entry(&mut self, format: TrailFormat, edit: impl FnOnce(&mut LogEntry)) -> bool {
        match self.entry.take() {
            Some(mut entry) => {
                edit(&mut entry);
                self.set_entry(entry, format);
                true
            }
            None => false,
        }
    }
}

/// The whole history log, newest line first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryLog {
    lines: Vec<LogLine>,
}

impl HistoryLog {
    /// Split a document body into lines.
    pub fn parse(body: &str) -> Self {
        Self {
            lines: body.split('\n').map(LogLine::parse).collect(),
        }
    }

    /// Join the lines back into a document body.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(LogLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of lines, opaque ones included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log has no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines.
    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    /// Line at `index`.
    pub fn line(&self, index: usize) -> Option<&LogLine> {
        self.lines.get(index)
    }

    /// Mutable line at `index`.
    pub fn line_mut(&mut self, index: usize) -> Option<&mut LogLine> {
        self.lines.get_mut(index)
    }

    /// Parsed entries with their line index, newest first.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &LogEntry)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| line.entry().map(|entry| (i, entry)))
    }

    /// Entry on the first line, if that line parses.
    pub fn head(&self) -> Option<&LogEntry> {
        self.lines.first().and_then(LogLine::entry)
    }

    /// Insert a new entry as the newest line.
    pub fn prepend(&mut self, entry: LogEntry, format: TrailFormat) {
        self.lines.insert(0, LogLine::from_entry(entry, format));
    }

    /// Remove and return the first line.
    pub fn pop_front(&mut self) -> Option<LogLine> {
        if self.lines.is_empty() {
            None
        } else {
            Some(self.lines.remove(0))
        }
    }

    /// Remove and return the last line.
    pub fn pop_back(&mut self) -> Option<LogLine> {
        self.lines.pop()
    }

    /// Append lines at the end, in order.
    pub fn extend(&mut self, lines: impl IntoIterator<Item = LogLine>) {
        self.lines.extend(lines);
    }
}
