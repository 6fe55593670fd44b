//! Cross-breeding. When a plant is harvested, each Moore neighbor is a
//! potential partner; the first pair that wins its probability roll
//! grants a variant seed. Variants themselves never breed.

pub mod rules;

use bevy::prelude::Resource;
use rand::Rng;
use std::collections::HashMap;

use crate::garden::Garden;
use crate::shared::{GridPos, PlantRegistry, PlantTypeId, Rarity, SimRng};

/// One cross-breeding rule. `pair` is the canonical (sorted) type pair,
/// so lookup is order-independent.
#[derive(Debug, Clone)]
pub struct MutationRule {
    pub pair: (PlantTypeId, PlantTypeId),
    pub result_id: PlantTypeId,
    pub base_chance: f32,
    pub rarity: Rarity,
}

/// Sort two type ids into the canonical pair key.
pub fn pair_key(a: &str, b: &str) -> (PlantTypeId, PlantTypeId) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct MutationTable {
    rules: HashMap<(PlantTypeId, PlantTypeId), MutationRule>,
}

impl MutationTable {
    pub fn insert(&mut self, rule: MutationRule) {
        self.rules.insert(rule.pair.clone(), rule);
    }

    pub fn get(&self, a: &str, b: &str) -> Option<&MutationRule> {
        self.rules.get(&pair_key(a, b))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A successful cross-breeding roll.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub variant_id: PlantTypeId,
    pub partner_id: PlantTypeId,
    pub rarity: Rarity,
}

/// Roll for a mutation at harvest time.
///
/// Walks the harvested cell's Moore neighbors in the fixed offset order
/// and performs an independent Bernoulli trial for each neighbor that
/// forms a known pair with the harvested type. The first success wins;
/// at most one variant seed is granted per harvest. `chance_multiplier`
/// is the harvested type's mastery mutation multiplier.
pub fn check_for_mutation(
    pos: GridPos,
    harvested_type: &str,
    garden: &Garden,
    registry: &PlantRegistry,
    table: &MutationTable,
    chance_multiplier: f32,
    rng: &mut SimRng,
) -> Option<MutationOutcome> {
    let harvested_def = registry.get(harvested_type)?;
    if harvested_def.is_variant() {
        return None;
    }

    for neighbor in garden.neighbors(pos) {
        let partner_is_variant = registry
            .get(&neighbor.type_id)
            .map_or(true, |def| def.is_variant());
        if partner_is_variant {
            continue;
        }

        let Some(rule) = table.get(harvested_type, &neighbor.type_id) else {
            continue;
        };
        let chance = rule.base_chance * chance_multiplier;
        if rng.0.gen::<f32>() < chance {
            return Some(MutationOutcome {
                variant_id: rule.result_id.clone(),
                partner_id: neighbor.type_id.clone(),
                rarity: rule.rarity,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::plants::populate_plants;
    use crate::mutation::rules::{mutation_rules, variant_defs};

    fn setup() -> (PlantRegistry, MutationTable) {
        let mut registry = PlantRegistry::default();
        populate_plants(&mut registry);
        for def in variant_defs() {
            assert!(registry.register_variant(def));
        }
        let mut table = MutationTable::default();
        for rule in mutation_rules() {
            table.insert(rule);
        }
        (registry, table)
    }

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(pair_key("tomato", "basil"), pair_key("basil", "tomato"));
        let (_registry, table) = setup();
        assert!(table.get("tomato", "basil").is_some());
        assert!(table.get("basil", "tomato").is_some());
        assert!(table.get("tomato", "carrot").is_none());
    }

    #[test]
    fn mutation_rate_matches_base_chance_statistically() {
        let (registry, table) = setup();
        let mut garden = Garden::new(5, 5);
        garden.plant_seed("tomato", GridPos::new(2, 2), &registry);
        garden.plant_seed("basil", GridPos::new(2, 3), &registry);

        let mut rng = SimRng::seeded(42);
        let trials = 2000;
        let successes = (0..trials)
            .filter(|_| {
                check_for_mutation(
                    GridPos::new(2, 2),
                    "tomato",
                    &garden,
                    &registry,
                    &table,
                    1.0,
                    &mut rng,
                )
                .is_some()
            })
            .count();

        // tomato+basil is a 10% roll; 2000 trials should land well
        // within ±3 standard deviations (σ ≈ 13.4).
        let expected = (trials as f32 * 0.10) as isize;
        let delta = (successes as isize - expected).abs();
        assert!(delta < 45, "got {successes} successes, expected ≈{expected}");
    }

    #[test]
    fn mastery_multiplier_scales_the_roll() {
        let (registry, table) = setup();
        let mut garden = Garden::new(5, 5);
        garden.plant_seed("tomato", GridPos::new(2, 2), &registry);
        garden.plant_seed("basil", GridPos::new(2, 3), &registry);

        let mut rng = SimRng::seeded(7);
        let trials = 2000;
        let successes = (0..trials)
            .filter(|_| {
                check_for_mutation(
                    GridPos::new(2, 2),
                    "tomato",
                    &garden,
                    &registry,
                    &table,
                    2.0,
                    &mut rng,
                )
                .is_some()
            })
            .count();

        let expected = (trials as f32 * 0.20) as isize;
        let delta = (successes as isize - expected).abs();
        assert!(delta < 55, "got {successes} successes, expected ≈{expected}");
    }

    #[test]
    fn variants_never_breed_from_either_side() {
        let (registry, table) = setup();
        let mut garden = Garden::new(5, 5);
        garden.plant_seed("tomato_golden", GridPos::new(2, 2), &registry);
        garden.plant_seed("basil", GridPos::new(2, 3), &registry);

        let mut rng = SimRng::seeded(1);
        // Harvested side is a variant: no roll at all.
        for _ in 0..500 {
            assert!(check_for_mutation(
                GridPos::new(2, 2),
                "tomato_golden",
                &garden,
                &registry,
                &table,
                10.0,
                &mut rng,
            )
            .is_none());
        }

        // Partner side is a variant: that neighbor is skipped.
        let mut garden = Garden::new(5, 5);
        garden.plant_seed("tomato", GridPos::new(2, 2), &registry);
        garden.plant_seed("basil_golden", GridPos::new(2, 3), &registry);
        for _ in 0..500 {
            assert!(check_for_mutation(
                GridPos::new(2, 2),
                "tomato",
                &garden,
                &registry,
                &table,
                10.0,
                &mut rng,
            )
            .is_none());
        }
    }

    #[test]
    fn same_type_pairs_can_mutate() {
        let (registry, table) = setup();
        let mut garden = Garden::new(5, 5);
        garden.plant_seed("tulip", GridPos::new(2, 2), &registry);
        garden.plant_seed("tulip", GridPos::new(3, 2), &registry);

        // With the chance forced to certainty the first qualifying
        // neighbor must produce the purple tulip.
        let mut rng = SimRng::seeded(3);
        let outcome = check_for_mutation(
            GridPos::new(2, 2),
            "tulip",
            &garden,
            &registry,
            &table,
            // 0.10 base × 10 ⇒ p = 1.0
            10.0,
            &mut rng,
        )
        .expect("certain roll must succeed");
        assert_eq!(outcome.variant_id, "tulip_purple");
        assert_eq!(outcome.partner_id, "tulip");
        assert_eq!(outcome.rarity, Rarity::Rare);
    }

    #[test]
    fn isolated_plant_never_mutates() {
        let (registry, table) = setup();
        let mut garden = Garden::new(5, 5);
        garden.plant_seed("tomato", GridPos::new(2, 2), &registry);

        let mut rng = SimRng::seeded(9);
        for _ in 0..200 {
            assert!(check_for_mutation(
                GridPos::new(2, 2),
                "tomato",
                &garden,
                &registry,
                &table,
                10.0,
                &mut rng,
            )
            .is_none());
        }
    }

    #[test]
    fn every_rule_result_is_a_registered_variant() {
        let (registry, table) = setup();
        assert_eq!(table.len(), 5);
        for rule in mutation_rules() {
            let def = registry.get(&rule.result_id).unwrap();
            assert!(def.is_variant());
            assert!(def.seed_price.is_none(), "variant seeds are never sold");
            assert_eq!(def.rarity, rule.rarity);
        }
    }
}
