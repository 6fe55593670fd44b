//! Base plant type definitions.
//!
//! Mutation variants live in `crate::mutation::rules` and are
//! registered additively after these.

use crate::shared::{PlantDef, PlantRegistry, Rarity};

/// Insert the five base plant types into the registry.
pub fn populate_plants(registry: &mut PlantRegistry) {
    registry.insert(PlantDef {
        id: "tomato".into(),
        name: "Tomato".into(),
        emoji: "🍅".into(),
        growth_time_secs: 5.0,
        companions: vec!["basil".into()],
        harvest_yield: 1,
        seed_price: Some(10),
        sell_price: 25,
        base_id: None,
        rarity: Rarity::Common,
    });

    registry.insert(PlantDef {
        id: "sunflower".into(),
        name: "Sunflower".into(),
        emoji: "🌻".into(),
        growth_time_secs: 4.0,
        // Sunflowers get along with everyone.
        companions: vec!["*".into()],
        harvest_yield: 1,
        seed_price: Some(8),
        sell_price: 20,
        base_id: None,
        rarity: Rarity::Common,
    });

    registry.insert(PlantDef {
        id: "tulip".into(),
        name: "Tulip".into(),
        emoji: "🌷".into(),
        growth_time_secs: 4.5,
        companions: vec!["tulip".into()],
        harvest_yield: 1,
        seed_price: Some(12),
        sell_price: 30,
        base_id: None,
        rarity: Rarity::Common,
    });

    registry.insert(PlantDef {
        id: "carrot".into(),
        name: "Carrot".into(),
        emoji: "🥕".into(),
        growth_time_secs: 6.0,
        // Onions aren't in the garden yet; carrots grow alone for now.
        companions: vec!["onion".into()],
        harvest_yield: 1,
        seed_price: Some(6),
        sell_price: 15,
        base_id: None,
        rarity: Rarity::Common,
    });

    registry.insert(PlantDef {
        id: "basil".into(),
        name: "Basil".into(),
        emoji: "🌿".into(),
        growth_time_secs: 3.5,
        companions: vec!["tomato".into()],
        harvest_yield: 1,
        seed_price: Some(5),
        sell_price: 12,
        base_id: None,
        rarity: Rarity::Common,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_types_are_present_and_purchasable() {
        let mut registry = PlantRegistry::default();
        populate_plants(&mut registry);

        assert_eq!(registry.len(), 5);
        for id in ["tomato", "sunflower", "tulip", "carrot", "basil"] {
            let def = registry.get(id).unwrap();
            assert!(def.seed_price.is_some(), "{id} should be buyable");
            assert!(!def.is_variant());
            assert!(def.growth_time_secs > 0.0);
        }
    }

    #[test]
    fn tomato_and_basil_are_mutual_companions() {
        let mut registry = PlantRegistry::default();
        populate_plants(&mut registry);

        assert!(registry.get("tomato").unwrap().is_companion_of("basil"));
        assert!(registry.get("basil").unwrap().is_companion_of("tomato"));
        assert!(registry.get("sunflower").unwrap().is_companion_of("carrot"));
        assert!(!registry.get("carrot").unwrap().is_companion_of("tomato"));
    }
}
