//! Configuration types

use crate::codec::TrailFormat;
use crate::{ConfigError, HistResult, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether an entry for the same item counts as linked to the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfLinkPolicy {
    /// A previous visit to the same item ends the walk as a link
    #[default]
    Linked,
    /// A previous visit to the same item is treated like any unlinked item
    NotLinked,
}

/// Time window used for the frequent-items statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreqScope {
    /// Same calendar day
    Today,
    /// Last seven days
    #[default]
    Week,
    /// Same calendar month
    Month,
    /// Same calendar year
    Year,
    /// Whole log
    All,
}

/// Upper bound for `trail_records` and `trail_display`.
pub const MAX_TRAIL_LEVELS: u32 = 10;
/// Upper bound for `trail_length`.
pub const MAX_TRAIL_LENGTH: u32 = 100;
/// Upper bound for `freq_display`.
pub const MAX_FREQ_DISPLAY: u32 = 100;

/// Master configuration snapshot. Read once at the start of every visit run
/// and never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistConfig {
    // Log target
    /// Document holding the log
    pub hist_note_id: Option<ItemId>,
    /// Items that are never logged
    pub exclude_items: BTreeSet<ItemId>,
    /// Title written when the visited item has none yet
    pub untitled_placeholder: String,

    // Retention (<= 0 disables the pass)
    /// Minimum seconds between consecutive entries
    pub sec_between_items: i64,
    /// Days of history to keep
    pub max_days: i64,

    // Trails
    /// Number of trail levels to record (0 disables annotation)
    pub trail_records: u32,
    /// How many entries back the walk may look for a link
    pub trail_length: u32,
    /// Whether a reference from the older item back to the new one counts
    pub trail_backlinks: bool,
    /// Placement of the trail block in a line
    pub trail_format: TrailFormat,
    /// How a previous visit to the same item is treated
    pub self_link: SelfLinkPolicy,

    // Read path
    /// Number of trail levels to plot (0 hides trails)
    pub trail_display: u32,
    /// Window for frequent items
    pub freq_scope: FreqScope,
    /// Number of frequent items to show
    pub freq_display: u32,
}

impl Default for HistConfig {
    fn default() -> Self {
        Self {
            hist_note_id: None,
            exclude_items: BTreeSet::new(),
            untitled_placeholder: "Untitled".to_string(),
            sec_between_items: 0,
            max_days: 90,
            trail_records: 6,
            trail_length: 10,
            trail_backlinks: true,
            trail_format: TrailFormat::BeforeTitle,
            self_link: SelfLinkPolicy::Linked,
            trail_display: 3,
            freq_scope: FreqScope::Week,
            freq_display: 5,
        }
    }
}

impl HistConfig {
    /// Default configuration logging into `hist_note_id`.
    pub fn for_log(hist_note_id: impl Into<ItemId>) -> Self {
        Self {
            hist_note_id: Some(hist_note_id.into()),
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> HistResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Whether trail annotation runs.
    pub fn trails_enabled(&self) -> bool {
        self.trail_records > 0
    }

    /// Whether `id` must not be logged (the log document or an excluded item).
    pub fn is_excluded(&self, id: &ItemId) -> bool {
        self.hist_note_id.as_ref() == Some(id) || self.exclude_items.contains(id)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - trail_records, trail_display <= 10
    /// - trail_length <= 100
    /// - freq_display <= 100
    /// - untitled_placeholder is not empty
    pub fn validate(&self) -> HistResult<()> {
        check_max("trail_records", self.trail_records, MAX_TRAIL_LEVELS)?;
        check_max("trail_display", self.trail_display, MAX_TRAIL_LEVELS)?;
        check_max("trail_length", self.trail_length, MAX_TRAIL_LENGTH)?;
        check_max("freq_display", self.freq_display, MAX_FREQ_DISPLAY)?;

        if self.untitled_placeholder.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "untitled_placeholder".to_string(),
                value: format!("{:?}", self.untitled_placeholder),
                reason: "untitled_placeholder must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn check_max(field: &str, value: u32, max: u32) -> HistResult<()> {
    if value > max {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: format!("{field} must be at most {max}"),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HistError;

    #[test]
    fn test_default_is_valid() {
        assert!(HistConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_too_many_levels() {
        let config = HistConfig {
            trail_records: 11,
            ..HistConfig::default()
        };
        let err = config.validate().unwrap_err();
        match err {
            HistError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "trail_records")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_empty_placeholder() {
        let config = HistConfig {
            untitled_placeholder: "  ".to_string(),
            ..HistConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_trail_records_disables_trails() {
        let config = HistConfig {
            trail_records: 0,
            ..HistConfig::default()
        };
        assert!(!config.trails_enabled());
        assert!(HistConfig::default().trails_enabled());
    }

    #[test]
    fn test_is_excluded() {
        let mut config = HistConfig::for_log("hist");
        config.exclude_items.insert(ItemId::new("secret"));
        assert!(config.is_excluded(&ItemId::new("hist")));
        assert!(config.is_excluded(&ItemId::new("secret")));
        assert!(!config.is_excluded(&ItemId::new("other")));
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = HistConfig::from_toml_str(
            r#"
            hist_note_id = "acd86f64"
            exclude_items = ["x", "y"]
            sec_between_items = 60
            trail_format = "after_title"
            self_link = "not_linked"
            freq_scope = "month"
            "#,
        )
        .unwrap();
        assert_eq!(config.hist_note_id, Some(ItemId::new("acd86f64")));
        assert_eq!(config.exclude_items.len(), 2);
        assert_eq!(config.sec_between_items, 60);
        assert_eq!(config.trail_format, TrailFormat::AfterTitle);
        assert_eq!(config.self_link, SelfLinkPolicy::NotLinked);
        assert_eq!(config.freq_scope, FreqScope::Month);
        assert_eq!(config.max_days, 90);
    }

    #[test]
    fn test_from_toml_str_rejects_out_of_range() {
        let result = HistConfig::from_toml_str("trail_length = 500");
        assert!(matches!(result, Err(HistError::Config(ConfigError::InvalidValue { .. }))));
    }

    #[test]
    fn test_from_toml_str_rejects_bad_syntax() {
        let result = HistConfig::from_toml_str("trail_length = ");
        assert!(matches!(result, Err(HistError::Config(ConfigError::Parse { .. }))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = HistConfig::for_log("hist");
        let json = serde_json::to_string(&config).unwrap();
        let back: HistConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
