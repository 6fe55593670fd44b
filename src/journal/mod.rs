//! The gardener's journal: a per-type harvest ledger that feeds the
//! mastery system. Mastery only ever goes up, and every tier grants a
//! permanent multiplier somewhere in the simulation.

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::{current_timestamp, PlantTypeId};

/// One mastery tier. Tiers are cumulative: each level keeps the best
/// multiplier reached so far for every category.
pub struct MasteryTier {
    pub level: u8,
    pub harvests_required: u64,
    pub title: &'static str,
    pub perk: &'static str,
    pub sell_multiplier: f32,
    pub growth_multiplier: f32,
    pub mutation_multiplier: f32,
}

pub const MASTERY_TIERS: [MasteryTier; 4] = [
    MasteryTier {
        level: 0,
        harvests_required: 0,
        title: "Novice",
        perk: "",
        sell_multiplier: 1.0,
        growth_multiplier: 1.0,
        mutation_multiplier: 1.0,
    },
    MasteryTier {
        level: 1,
        harvests_required: 10,
        title: "Green Thumb",
        perk: "sells for 10% more",
        sell_multiplier: 1.1,
        growth_multiplier: 1.0,
        mutation_multiplier: 1.0,
    },
    MasteryTier {
        level: 2,
        harvests_required: 50,
        title: "Cultivator",
        perk: "grows 20% faster",
        sell_multiplier: 1.1,
        growth_multiplier: 1.2,
        mutation_multiplier: 1.0,
    },
    MasteryTier {
        level: 3,
        harvests_required: 100,
        title: "Master Gardener",
        perk: "mutations are twice as likely",
        sell_multiplier: 1.1,
        growth_multiplier: 1.2,
        mutation_multiplier: 2.0,
    },
];

fn level_for_harvests(count: u64) -> u8 {
    MASTERY_TIERS
        .iter()
        .rev()
        .find(|tier| count >= tier.harvests_required)
        .map(|tier| tier.level)
        .unwrap_or(0)
}

fn tier(level: u8) -> &'static MasteryTier {
    &MASTERY_TIERS[level.min(3) as usize]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub times_harvested: u64,
    pub mastery_level: u8,
    pub first_discovered: u64,
    pub last_harvested: u64,
}

/// A mastery tier was reached. Returned by [`Journal::record_harvest`]
/// so the caller can emit the level-up event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUp {
    pub new_level: u8,
    pub description: String,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    pub entries: HashMap<PlantTypeId, JournalEntry>,
}

impl Journal {
    pub fn entry(&self, type_id: &str) -> Option<&JournalEntry> {
        self.entries.get(type_id)
    }

    pub fn times_harvested(&self, type_id: &str) -> u64 {
        self.entries.get(type_id).map_or(0, |e| e.times_harvested)
    }

    pub fn mastery_level(&self, type_id: &str) -> u8 {
        self.entries.get(type_id).map_or(0, |e| e.mastery_level)
    }

    pub fn sell_multiplier(&self, type_id: &str) -> f32 {
        tier(self.mastery_level(type_id)).sell_multiplier
    }

    pub fn growth_multiplier(&self, type_id: &str) -> f32 {
        tier(self.mastery_level(type_id)).growth_multiplier
    }

    pub fn mutation_multiplier(&self, type_id: &str) -> f32 {
        tier(self.mastery_level(type_id)).mutation_multiplier
    }

    /// Record a harvest of `amount` crops. The ledger counts crops,
    /// not harvest actions, so a high-yield variant progresses mastery
    /// faster. Creates the entry on first harvest. Returns the
    /// level-up when a tier threshold was crossed. Mastery is
    /// monotonic: the stored level never decreases, even if the tier
    /// table were to change between saves.
    pub fn record_harvest(&mut self, type_id: &str, amount: u64) -> Option<LevelUp> {
        let now = current_timestamp();
        let entry = self
            .entries
            .entry(type_id.to_string())
            .or_insert_with(|| JournalEntry {
                times_harvested: 0,
                mastery_level: 0,
                first_discovered: now,
                last_harvested: now,
            });

        entry.times_harvested += amount;
        entry.last_harvested = now;

        let reached = level_for_harvests(entry.times_harvested);
        if reached > entry.mastery_level {
            entry.mastery_level = reached;
            let reached_tier = tier(reached);
            return Some(LevelUp {
                new_level: reached,
                description: format!("{}: {}", reached_tier.title, reached_tier.perk),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_harvest_creates_entry_at_level_zero() {
        let mut journal = Journal::default();
        assert!(journal.record_harvest("tomato", 1).is_none());

        let entry = journal.entry("tomato").unwrap();
        assert_eq!(entry.times_harvested, 1);
        assert_eq!(entry.mastery_level, 0);
        assert_eq!(journal.times_harvested("carrot"), 0);
    }

    #[test]
    fn level_ups_fire_exactly_at_thresholds() {
        let mut journal = Journal::default();
        let mut level_ups = Vec::new();
        for _ in 0..100 {
            if let Some(up) = journal.record_harvest("basil", 1) {
                level_ups.push((journal.times_harvested("basil"), up.new_level));
            }
        }
        assert_eq!(level_ups, vec![(10, 1), (50, 2), (100, 3)]);
    }

    #[test]
    fn harvest_amount_counts_crops_not_actions() {
        let mut journal = Journal::default();
        // Five yield-2 harvests reach the 10-crop tier, same as ten
        // yield-1 harvests.
        for _ in 0..4 {
            assert!(journal.record_harvest("tomato_golden", 2).is_none());
        }
        let up = journal
            .record_harvest("tomato_golden", 2)
            .expect("tenth crop crosses the tier");
        assert_eq!(up.new_level, 1);
        assert_eq!(journal.times_harvested("tomato_golden"), 10);
    }

    #[test]
    fn oversized_amount_can_skip_straight_past_a_tier() {
        let mut journal = Journal::default();
        journal.record_harvest("carrot", 9);
        // 9 → 52 crosses both the 10 and 50 thresholds in one step;
        // the level-up reports the tier actually reached.
        let up = journal.record_harvest("carrot", 43).unwrap();
        assert_eq!(up.new_level, 2);
        assert_eq!(journal.mastery_level("carrot"), 2);
    }

    #[test]
    fn mastery_is_monotonic_and_capped() {
        let mut journal = Journal::default();
        let mut last_level = 0;
        for _ in 0..250 {
            journal.record_harvest("tulip", 1);
            let level = journal.mastery_level("tulip");
            assert!(level >= last_level, "mastery must never decrease");
            last_level = level;
        }
        assert_eq!(last_level, 3);
    }

    #[test]
    fn multipliers_follow_the_tier_table() {
        let mut journal = Journal::default();
        assert_eq!(journal.sell_multiplier("tomato"), 1.0);
        assert_eq!(journal.growth_multiplier("tomato"), 1.0);
        assert_eq!(journal.mutation_multiplier("tomato"), 1.0);

        journal.record_harvest("tomato", 10);
        assert_eq!(journal.sell_multiplier("tomato"), 1.1);
        assert_eq!(journal.growth_multiplier("tomato"), 1.0);

        journal.record_harvest("tomato", 40);
        assert_eq!(journal.growth_multiplier("tomato"), 1.2);
        assert_eq!(journal.mutation_multiplier("tomato"), 1.0);

        journal.record_harvest("tomato", 50);
        assert_eq!(journal.sell_multiplier("tomato"), 1.1);
        assert_eq!(journal.growth_multiplier("tomato"), 1.2);
        assert_eq!(journal.mutation_multiplier("tomato"), 2.0);
    }

    #[test]
    fn types_progress_independently() {
        let mut journal = Journal::default();
        journal.record_harvest("tomato", 10);
        assert_eq!(journal.mastery_level("tomato"), 1);
        assert_eq!(journal.mastery_level("basil"), 0);
    }

    #[test]
    fn journal_snapshot_roundtrip() {
        let mut journal = Journal::default();
        for _ in 0..12 {
            journal.record_harvest("tomato", 1);
        }
        journal.record_harvest("basil", 1);

        let json = serde_json::to_string(&journal).unwrap();
        let restored: Journal = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.times_harvested("tomato"), 12);
        assert_eq!(restored.mastery_level("tomato"), 1);
        assert_eq!(restored.times_harvested("basil"), 1);
    }
}
