//! Garden domain: the grid resource, plant entities, and the frame
//! tick. Player intents arrive as events; the systems here validate
//! them against the grid and the obstacle field, then mutate state.

pub mod grid;
pub mod harvest;
pub mod plant;

pub use grid::{Garden, GardenSnapshot, GardenStats, Recommendation};
pub use plant::{HarvestResult, Plant, PlantId, PlantSnapshot};

use bevy::prelude::*;

use crate::journal::Journal;
use crate::obstacles::ObstacleField;
use crate::shared::{
    GameState, Inventory, PlantRegistry, PlantSeedEvent, ToastEvent, WaterPlantEvent,
};
use crate::weather::RainState;

pub struct GardenPlugin;

impl Plugin for GardenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Garden>().add_systems(
            Update,
            (
                handle_plant_seed,
                handle_water_plant,
                tick_garden,
                promote_harvest_ready,
                harvest::handle_harvest,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Plant requested seeds. A seed is only consumed when the placement
/// actually succeeds; every rejection leaves both the garden and the
/// inventory untouched.
fn handle_plant_seed(
    mut events: EventReader<PlantSeedEvent>,
    mut garden: ResMut<Garden>,
    mut inventory: ResMut<Inventory>,
    registry: Res<PlantRegistry>,
    obstacles: Res<ObstacleField>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in events.read() {
        if obstacles.has_rock_at(event.pos) {
            debug!(
                "planting rejected: rock at ({}, {})",
                event.pos.x, event.pos.y
            );
            continue;
        }
        if inventory.seed_count(&event.type_id) == 0 {
            toasts.send(ToastEvent {
                message: format!("No {} seeds left!", event.type_id),
                duration_secs: 2.0,
            });
            continue;
        }
        if garden.plant_seed(&event.type_id, event.pos, &registry).is_some() {
            inventory.use_seed(&event.type_id);
            debug!(
                "planted {} at ({}, {})",
                event.type_id, event.pos.x, event.pos.y
            );
        }
    }
}

fn handle_water_plant(mut events: EventReader<WaterPlantEvent>, mut garden: ResMut<Garden>) {
    for event in events.read() {
        garden.water_plant_at(event.pos);
    }
}

/// The frame tick. Each plant grows at its own rate, scaled by its
/// type's mastery bonus and the current weather.
fn tick_garden(
    time: Res<Time>,
    mut garden: ResMut<Garden>,
    journal: Res<Journal>,
    rain: Res<RainState>,
) {
    let weather = rain.growth_multiplier();
    garden.update(time.delta_secs(), |type_id| {
        journal.growth_multiplier(type_id) * weather
    });
}

/// Sequenced after the growth update so a plant reaching FullGrown is
/// promoted on the same frame it finished growing.
fn promote_harvest_ready(mut garden: ResMut<Garden>) {
    garden.check_harvest_ready_all();
}
