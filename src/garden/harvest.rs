//! The harvest pipeline. One successful harvest touches most of the
//! simulation in a fixed order: crops to the inventory, the journal
//! ledger (which may level mastery up), the cross-breeding roll
//! (which may grant a variant seed), and finally removal of the plant
//! from the grid.

use bevy::prelude::*;

use super::Garden;
use crate::journal::Journal;
use crate::mutation::{check_for_mutation, MutationTable};
use crate::shared::{
    HarvestAttemptEvent, Inventory, MasteryLevelUpEvent, MutationEvent, PlantHarvestedEvent,
    PlantRegistry, SimRng, ToastEvent,
};

#[allow(clippy::too_many_arguments)]
pub fn handle_harvest(
    mut attempts: EventReader<HarvestAttemptEvent>,
    mut garden: ResMut<Garden>,
    registry: Res<PlantRegistry>,
    table: Res<MutationTable>,
    mut journal: ResMut<Journal>,
    mut inventory: ResMut<Inventory>,
    mut rng: ResMut<SimRng>,
    mut harvested: EventWriter<PlantHarvestedEvent>,
    mut mutations: EventWriter<MutationEvent>,
    mut level_ups: EventWriter<MasteryLevelUpEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for attempt in attempts.read() {
        let pos = attempt.pos;
        let Some(plant) = garden.plant_at(pos) else {
            debug!("harvest rejected: no plant at ({}, {})", pos.x, pos.y);
            continue;
        };
        let Some(def) = registry.get(&plant.type_id) else {
            warn!("harvest rejected: unknown type {:?}", plant.type_id);
            continue;
        };
        let Some(result) = plant.harvest(def) else {
            debug!(
                "harvest rejected: {} at ({}, {}) is not ready",
                plant.type_id, pos.x, pos.y
            );
            continue;
        };

        inventory.add_crops(&result.type_id, result.amount);

        if let Some(level_up) = journal.record_harvest(&result.type_id, result.amount as u64) {
            info!(
                "{} mastery reached level {}",
                result.type_id, level_up.new_level
            );
            toasts.send(ToastEvent {
                message: format!("{}: {}", def.name, level_up.description),
                duration_secs: 4.0,
            });
            level_ups.send(MasteryLevelUpEvent {
                type_id: result.type_id.clone(),
                new_level: level_up.new_level,
                description: level_up.description,
            });
        }

        // The roll happens while the plant still occupies its cell so
        // the neighborhood is the one the player sees.
        let chance_multiplier = journal.mutation_multiplier(&result.type_id);
        if let Some(outcome) = check_for_mutation(
            pos,
            &result.type_id,
            &garden,
            &registry,
            &table,
            chance_multiplier,
            &mut rng,
        ) {
            inventory.add_seeds(&outcome.variant_id, 1);
            let variant_name = registry
                .get(&outcome.variant_id)
                .map(|v| v.name.clone())
                .unwrap_or_else(|| outcome.variant_id.clone());
            info!(
                "mutation: {} + {} -> {}",
                result.type_id, outcome.partner_id, outcome.variant_id
            );
            toasts.send(ToastEvent {
                message: format!("A {variant_name} seed appeared!"),
                duration_secs: 5.0,
            });
            mutations.send(MutationEvent {
                variant_id: outcome.variant_id,
                parent_id: result.type_id.clone(),
                partner_id: outcome.partner_id,
                rarity: outcome.rarity,
                pos,
            });
        }

        garden.remove_plant(pos, &registry);
        harvested.send(PlantHarvestedEvent {
            type_id: result.type_id,
            amount: result.amount,
            pos,
        });
    }
}
