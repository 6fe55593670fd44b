//! The rain cloud. Summoning it waters every plant at once and doubles
//! growth while it lasts; when it passes, a short rainbow lingers.
//! Everything is countdown state ticked from the frame delta — nothing
//! here schedules a callback.

use bevy::prelude::*;

use crate::garden::Garden;
use crate::shared::{GameState, StartRainEvent, ToastEvent};

pub const RAIN_DURATION_SECS: f32 = 30.0;
pub const RAIN_GROWTH_MULTIPLIER: f32 = 2.0;
pub const RAINBOW_DURATION_SECS: f32 = 5.0;

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct RainState {
    rain_secs_remaining: f32,
    rainbow_secs_remaining: f32,
}

impl RainState {
    pub fn is_raining(&self) -> bool {
        self.rain_secs_remaining > 0.0
    }

    pub fn has_rainbow(&self) -> bool {
        self.rainbow_secs_remaining > 0.0
    }

    pub fn growth_multiplier(&self) -> f32 {
        if self.is_raining() {
            RAIN_GROWTH_MULTIPLIER
        } else {
            1.0
        }
    }

    /// Begin (or restart) the downpour.
    pub fn start_rain(&mut self) {
        self.rain_secs_remaining = RAIN_DURATION_SECS;
        self.rainbow_secs_remaining = 0.0;
    }

    /// Advance the countdowns. The rainbow begins on the tick the rain
    /// runs out. Returns true on that transition.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.rain_secs_remaining > 0.0 {
            self.rain_secs_remaining -= dt;
            if self.rain_secs_remaining <= 0.0 {
                self.rain_secs_remaining = 0.0;
                self.rainbow_secs_remaining = RAINBOW_DURATION_SECS;
                return true;
            }
        } else if self.rainbow_secs_remaining > 0.0 {
            self.rainbow_secs_remaining = (self.rainbow_secs_remaining - dt).max(0.0);
        }
        false
    }
}

pub struct WeatherPlugin;

impl Plugin for WeatherPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RainState>().add_systems(
            Update,
            (handle_start_rain, tick_weather)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
    }
}

fn handle_start_rain(
    mut events: EventReader<StartRainEvent>,
    mut rain: ResMut<RainState>,
    mut garden: ResMut<Garden>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for _ in events.read() {
        rain.start_rain();
        garden.water_all();
        info!("rain cloud summoned, all plants watered");
        toasts.send(ToastEvent {
            message: "Rain is falling over the garden!".to_string(),
            duration_secs: 3.0,
        });
    }
}

fn tick_weather(
    time: Res<Time>,
    mut rain: ResMut<RainState>,
    mut toasts: EventWriter<ToastEvent>,
) {
    if rain.tick(time.delta_secs()) {
        debug!("rain ended, rainbow out");
        toasts.send(ToastEvent {
            message: "A rainbow arcs over the garden".to_string(),
            duration_secs: RAINBOW_DURATION_SECS,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_doubles_growth_only_while_active() {
        let mut rain = RainState::default();
        assert_eq!(rain.growth_multiplier(), 1.0);

        rain.start_rain();
        assert!(rain.is_raining());
        assert_eq!(rain.growth_multiplier(), RAIN_GROWTH_MULTIPLIER);

        rain.tick(RAIN_DURATION_SECS - 0.1);
        assert!(rain.is_raining());

        rain.tick(0.2);
        assert!(!rain.is_raining());
        assert_eq!(rain.growth_multiplier(), 1.0);
    }

    #[test]
    fn rainbow_follows_the_rain_then_fades() {
        let mut rain = RainState::default();
        rain.start_rain();
        assert!(!rain.has_rainbow());

        let transitioned = rain.tick(RAIN_DURATION_SECS + 0.01);
        assert!(transitioned);
        assert!(rain.has_rainbow());

        rain.tick(RAINBOW_DURATION_SECS - 0.1);
        assert!(rain.has_rainbow());
        rain.tick(0.2);
        assert!(!rain.has_rainbow());
    }

    #[test]
    fn restarting_rain_clears_a_lingering_rainbow() {
        let mut rain = RainState::default();
        rain.start_rain();
        rain.tick(RAIN_DURATION_SECS + 0.01);
        assert!(rain.has_rainbow());

        rain.start_rain();
        assert!(rain.is_raining());
        assert!(!rain.has_rainbow());
    }

    #[test]
    fn tick_transition_fires_once() {
        let mut rain = RainState::default();
        rain.start_rain();
        assert!(rain.tick(RAIN_DURATION_SECS + 1.0));
        assert!(!rain.tick(0.1));
        assert!(!rain.tick(100.0));
    }
}
