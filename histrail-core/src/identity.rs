//! Identity types for history entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Small positive integer identifying one concurrently open trail.
pub type TrailLevel = u32;

/// Level reserved for a direct link between adjacent entries. Never allocated.
pub const ADJACENT_LEVEL: TrailLevel = 1;

/// Lowest level the allocator hands out.
pub const FIRST_TRAIL_LEVEL: TrailLevel = 2;

/// Opaque, stable identifier of a visited item (or of the log document).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resource reference used by documents to link to this item (`:/<id>`).
    pub fn link_target(&self) -> String {
        format!(":/{}", self.0)
    }

    /// Whether `content` contains a reference to this item.
    ///
    /// The reference must end at the id: `:/ab` does not reference `a`.
    pub fn is_referenced_by(&self, content: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let target = self.link_target();
        content.match_indices(target.as_str()).any(|(start, _)| {
            content[start + target.len()..]
                .chars()
                .next()
                .map_or(true, |next| !is_id_char(next))
        })
    }
}

fn is_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
