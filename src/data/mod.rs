//! Static content loading. Populates the plant registry and the
//! mutation rule table during `GameState::Loading`, then hands off to
//! `Playing`.

pub mod plants;

use bevy::prelude::*;

use crate::mutation::rules::{mutation_rules, variant_defs};
use crate::mutation::MutationTable;
use crate::shared::{GameState, PlantRegistry};

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlantRegistry>()
            .init_resource::<MutationTable>()
            .add_systems(OnEnter(GameState::Loading), load_game_data);
    }
}

fn load_game_data(
    mut registry: ResMut<PlantRegistry>,
    mut mutations: ResMut<MutationTable>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    plants::populate_plants(&mut registry);

    for def in variant_defs() {
        if !registry.register_variant(def.clone()) {
            warn!("variant {:?} already registered, skipping", def.id);
        }
    }

    for rule in mutation_rules() {
        mutations.insert(rule);
    }

    info!(
        "game data loaded: {} plant types, {} mutation rules",
        registry.len(),
        mutations.len()
    );
    next_state.set(GameState::Playing);
}
