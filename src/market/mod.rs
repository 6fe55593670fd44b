//! The village market and the day cycle that drives it. Each new day
//! one plant type is "trending" and sells at a premium; mastery adds
//! its own sell bonus on top. Buying seeds and selling crops both go
//! through here so the price math lives in one place.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::journal::Journal;
use crate::shared::{
    GameState, Inventory, NewDayEvent, PlantRegistry, PlantTypeId, SimRng, ToastEvent,
};

/// Sim-seconds per in-game day.
pub const DAY_LENGTH_SECS: f32 = 180.0;
pub const TRENDING_MULTIPLIER: f32 = 1.5;
/// How many redraws to attempt before accepting a repeat trend.
const TRENDING_REDRAW_ATTEMPTS: u32 = 10;

/// Day counter. Days advance from accumulated frame time; crossing the
/// boundary emits [`NewDayEvent`].
#[derive(Resource, Debug, Clone, Copy)]
pub struct DayCycle {
    pub day: u32,
    elapsed_in_day: f32,
}

impl Default for DayCycle {
    fn default() -> Self {
        Self {
            day: 1,
            elapsed_in_day: 0.0,
        }
    }
}

impl DayCycle {
    /// Jump to a specific day (loading a save). The intra-day clock
    /// restarts from the top of the day.
    pub fn set_day(&mut self, day: u32) {
        self.day = day;
        self.elapsed_in_day = 0.0;
    }

    /// Advance the clock; returns the new day number when one begins.
    /// A single oversized delta still advances at most one day.
    pub fn tick(&mut self, dt: f32) -> Option<u32> {
        self.elapsed_in_day += dt;
        if self.elapsed_in_day >= DAY_LENGTH_SECS {
            self.elapsed_in_day -= DAY_LENGTH_SECS;
            self.elapsed_in_day = self.elapsed_in_day.min(DAY_LENGTH_SECS);
            self.day += 1;
            Some(self.day)
        } else {
            None
        }
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Market {
    pub trending: Option<PlantTypeId>,
    pub last_update_day: u32,
}

impl Market {
    pub fn is_trending(&self, type_id: &str) -> bool {
        self.trending.as_deref() == Some(type_id)
    }

    /// Draw the day's trending type from the base (non-variant) types.
    /// Tries a handful of redraws to avoid repeating yesterday's trend;
    /// a repeat after that many attempts stands.
    pub fn update_day(&mut self, day: u32, registry: &PlantRegistry, rng: &mut SimRng) {
        if day == self.last_update_day {
            return;
        }
        self.last_update_day = day;

        let mut candidates: Vec<&PlantTypeId> = registry
            .plants
            .values()
            .filter(|def| !def.is_variant())
            .map(|def| &def.id)
            .collect();
        if candidates.is_empty() {
            self.trending = None;
            return;
        }
        // HashMap order is unstable; sort so the draw depends only on
        // the RNG stream.
        candidates.sort();

        let mut pick = candidates[rng.0.gen_range(0..candidates.len())];
        for _ in 0..TRENDING_REDRAW_ATTEMPTS {
            if self.trending.as_ref() != Some(pick) || candidates.len() == 1 {
                break;
            }
            pick = candidates[rng.0.gen_range(0..candidates.len())];
        }
        self.trending = Some(pick.clone());
    }

    /// Gold per crop of `type_id` today: base price, trending premium,
    /// then the mastery sell bonus, flooring after each multiplier.
    pub fn sell_price(&self, type_id: &str, registry: &PlantRegistry, journal: &Journal) -> u32 {
        let Some(def) = registry.get(type_id) else {
            return 0;
        };
        let mut price = def.sell_price;
        if self.is_trending(type_id) {
            price = (price as f32 * TRENDING_MULTIPLIER) as u32;
        }
        (price as f32 * journal.sell_multiplier(type_id)) as u32
    }

    pub fn seed_price(&self, type_id: &str, registry: &PlantRegistry) -> Option<u32> {
        registry.get(type_id).and_then(|def| def.seed_price)
    }
}

/// Buy one seed. False when the type is unknown, not purchasable, or
/// gold is short — the inventory is untouched in every failure case.
pub fn buy_seed(type_id: &str, registry: &PlantRegistry, inventory: &mut Inventory) -> bool {
    let Some(price) = registry.get(type_id).and_then(|def| def.seed_price) else {
        debug!("buy_seed rejected: {type_id:?} is not purchasable");
        return false;
    };
    if !inventory.spend_gold(price) {
        debug!("buy_seed rejected: not enough gold for {type_id:?}");
        return false;
    }
    inventory.add_seeds(type_id, 1);
    true
}

/// Sell every held crop of a type at today's price. Returns the gold
/// earned (0 when nothing was held).
pub fn sell_crops(
    type_id: &str,
    market: &Market,
    registry: &PlantRegistry,
    journal: &Journal,
    inventory: &mut Inventory,
) -> u32 {
    let held = inventory.crop_count(type_id);
    if held == 0 {
        return 0;
    }
    let sold = inventory.take_crops(type_id, held);
    let earned = sold * market.sell_price(type_id, registry, journal);
    inventory.add_gold(earned);
    earned
}

pub struct MarketPlugin;

impl Plugin for MarketPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DayCycle>()
            .init_resource::<Market>()
            .add_systems(
                Update,
                (tick_day_cycle, refresh_market)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn tick_day_cycle(
    time: Res<Time>,
    mut cycle: ResMut<DayCycle>,
    mut new_days: EventWriter<NewDayEvent>,
) {
    if let Some(day) = cycle.tick(time.delta_secs()) {
        info!("day {day} begins");
        new_days.send(NewDayEvent { day });
    }
}

fn refresh_market(
    mut new_days: EventReader<NewDayEvent>,
    mut market: ResMut<Market>,
    registry: Res<PlantRegistry>,
    mut rng: ResMut<SimRng>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in new_days.read() {
        market.update_day(event.day, &registry, &mut rng);
        if let Some(trending) = &market.trending {
            let name = registry
                .get(trending)
                .map(|def| def.name.clone())
                .unwrap_or_else(|| trending.clone());
            info!("trending today: {trending}");
            toasts.send(ToastEvent {
                message: format!("{name} is in demand today!"),
                duration_secs: 4.0,
            });
        }
    }
}
