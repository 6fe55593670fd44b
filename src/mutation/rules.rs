//! The cross-breeding rule table and the variant plant types it
//! produces. Variants are premium versions of a base type: faster
//! growth, bigger yields, better sell prices, no purchasable seeds.

use super::{pair_key, MutationRule};
use crate::shared::{PlantDef, Rarity};

pub fn mutation_rules() -> Vec<MutationRule> {
    vec![
        MutationRule {
            pair: pair_key("tomato", "basil"),
            result_id: "tomato_golden".into(),
            base_chance: 0.10,
            rarity: Rarity::Rare,
        },
        MutationRule {
            pair: pair_key("tulip", "tulip"),
            result_id: "tulip_purple".into(),
            base_chance: 0.10,
            rarity: Rarity::Rare,
        },
        MutationRule {
            pair: pair_key("sunflower", "tulip"),
            result_id: "sunflower_pink".into(),
            base_chance: 0.08,
            rarity: Rarity::Epic,
        },
        MutationRule {
            pair: pair_key("carrot", "basil"),
            result_id: "carrot_rainbow".into(),
            base_chance: 0.08,
            rarity: Rarity::Epic,
        },
        MutationRule {
            pair: pair_key("basil", "sunflower"),
            result_id: "basil_golden".into(),
            base_chance: 0.10,
            rarity: Rarity::Rare,
        },
    ]
}

pub fn variant_defs() -> Vec<PlantDef> {
    vec![
        PlantDef {
            id: "tomato_golden".into(),
            name: "Golden Tomato".into(),
            emoji: "🍅✨".into(),
            growth_time_secs: 4.5,
            companions: vec!["basil".into()],
            harvest_yield: 2,
            seed_price: None,
            sell_price: 75,
            base_id: Some("tomato".into()),
            rarity: Rarity::Rare,
        },
        PlantDef {
            id: "tulip_purple".into(),
            name: "Purple Tulip".into(),
            emoji: "🌷💜".into(),
            growth_time_secs: 4.0,
            companions: vec!["tulip".into()],
            harvest_yield: 2,
            seed_price: None,
            sell_price: 90,
            base_id: Some("tulip".into()),
            rarity: Rarity::Rare,
        },
        PlantDef {
            id: "sunflower_pink".into(),
            name: "Pink Sunflower".into(),
            emoji: "🌻🌸".into(),
            growth_time_secs: 3.5,
            companions: vec!["*".into()],
            harvest_yield: 3,
            seed_price: None,
            sell_price: 80,
            base_id: Some("sunflower".into()),
            rarity: Rarity::Epic,
        },
        PlantDef {
            id: "carrot_rainbow".into(),
            name: "Rainbow Carrot".into(),
            emoji: "🥕🌈".into(),
            growth_time_secs: 5.0,
            companions: vec!["onion".into()],
            harvest_yield: 3,
            seed_price: None,
            sell_price: 60,
            base_id: Some("carrot".into()),
            rarity: Rarity::Epic,
        },
        PlantDef {
            id: "basil_golden".into(),
            name: "Golden Basil".into(),
            emoji: "🌿✨".into(),
            growth_time_secs: 3.0,
            companions: vec!["tomato".into()],
            harvest_yield: 2,
            seed_price: None,
            sell_price: 45,
            base_id: Some("basil".into()),
            rarity: Rarity::Rare,
        },
    ]
}
