//! Verdant: a cozy, no-fail gardening simulation core.
//!
//! The crate is the simulation only — grid, growth, companions,
//! mutations, mastery, obstacles, market, weather, persistence. A
//! presentation layer drives it by sending the events in
//! [`shared`] and reading the resources back.

pub mod data;
pub mod garden;
pub mod journal;
pub mod market;
pub mod mutation;
pub mod obstacles;
pub mod save;
pub mod shared;
pub mod weather;

use bevy::prelude::*;

use crate::shared::*;

/// Everything the simulation needs on top of `MinimalPlugins` and
/// `StatesPlugin`: state, events, resources, and the domain plugins.
pub struct VerdantCorePlugin;

impl Plugin for VerdantCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_event::<PlantSeedEvent>()
            .add_event::<WaterPlantEvent>()
            .add_event::<HarvestAttemptEvent>()
            .add_event::<RemoveRockEvent>()
            .add_event::<PlantHarvestedEvent>()
            .add_event::<MutationEvent>()
            .add_event::<MasteryLevelUpEvent>()
            .add_event::<NewDayEvent>()
            .add_event::<StartRainEvent>()
            .add_event::<ToastEvent>()
            .init_resource::<Inventory>()
            .init_resource::<crate::journal::Journal>()
            .init_resource::<SimRng>()
            .add_plugins((
                crate::data::DataPlugin,
                crate::garden::GardenPlugin,
                crate::obstacles::ObstaclePlugin,
                crate::market::MarketPlugin,
                crate::weather::WeatherPlugin,
                crate::save::SavePlugin,
            ));
    }
}
