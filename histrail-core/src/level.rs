//! Trail level allocation.
//!
//! Level 1 is implicit for a direct link between adjacent entries and is
//! never handed out. Every other trail gets the smallest free level >= 2,
//! so concurrently open trails stay distinguishable and closed trails give
//! their number back.

use crate::{TrailLevel, TrailLevels, FIRST_TRAIL_LEVEL};

/// Smallest level >= 2 not present in `in_use`.
pub fn next_level(in_use: &TrailLevels) -> TrailLevel {
    let mut candidate = FIRST_TRAIL_LEVEL;
    for &level in in_use.range(FIRST_TRAIL_LEVEL..) {
        if level != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

/// Running set of levels seen along a walked prefix of the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelAllocator {
    in_use: TrailLevels,
}

impl LevelAllocator {
    /// Empty allocator: the first allocation is level 2.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `levels` as in use.
    pub fn absorb<'a>(&mut self, levels: impl IntoIterator<Item = &'a TrailLevel>) {
        self.in_use.extend(levels);
    }

    /// Level the next trail would get.
    pub fn peek(&self) -> TrailLevel {
        next_level(&self.in_use)
    }

    /// Levels seen so far.
    pub fn in_use(&self) -> &TrailLevels {
        &self.in_use
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(levels: &[TrailLevel]) -> TrailLevels {
        levels.iter().copied().collect()
    }

    #[test]
    fn test_empty_set_gives_two() {
        assert_eq!(next_level(&TrailLevels::new()), 2);
    }

    #[test]
    fn test_adjacent_level_is_ignored() {
        assert_eq!(next_level(&set(&[1])), 2);
        assert_eq!(next_level(&set(&[1, 2])), 3);
    }

    #[test]
    fn test_fills_lowest_gap() {
        assert_eq!(next_level(&set(&[2, 3, 5])), 4);
        assert_eq!(next_level(&set(&[3, 4])), 2);
    }

    #[test]
    fn test_open_trail_forces_next_level() {
        // Level 2 open along the prefix: an independent trail gets 3, not 2 or 4.
        let mut alloc = LevelAllocator::new();
        alloc.absorb(&set(&[2]));
        assert_eq!(alloc.peek(), 3);
    }

    #[test]
    fn test_closed_trail_is_reused() {
        // Walking past where the level-2 trail closed, only level 3 is in use.
        let mut alloc = LevelAllocator::new();
        alloc.absorb(&set(&[3]));
        assert_eq!(alloc.peek(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The allocated level is free, >= 2, and minimal.
        #[test]
        fn prop_next_level_is_minimal_free(levels in prop::collection::btree_set(1u32..20, 0..12)) {
            let next = next_level(&levels);
            prop_assert!(next >= FIRST_TRAIL_LEVEL);
            prop_assert!(!levels.contains(&next));
            for lower in FIRST_TRAIL_LEVEL..next {
                prop_assert!(levels.contains(&lower));
            }
        }
    }
}
