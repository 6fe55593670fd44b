//! Headless runner. Drives the simulation at a fixed cadence with no
//! window; a front end embeds [`verdant::VerdantCorePlugin`] the same
//! way and supplies its own input and rendering.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use verdant::VerdantCorePlugin;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(StatesPlugin)
        .add_plugins(bevy::log::LogPlugin::default())
        .add_plugins(VerdantCorePlugin)
        .run();
}
