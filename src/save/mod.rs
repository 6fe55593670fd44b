//! Persistence. Every subsystem serializes to JSON under its own
//! namespaced key in a string-keyed snapshot store: a saves directory
//! on native builds, localStorage on wasm32, and an in-memory map for
//! tests. Loading is forgiving — a missing or malformed snapshot logs
//! a warning and that subsystem starts fresh.

use bevy::prelude::*;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;

use crate::garden::{Garden, GardenSnapshot};
use crate::journal::Journal;
use crate::market::{DayCycle, Market};
use crate::obstacles::{ObstacleField, ObstacleSnapshot};
use crate::shared::{GameState, Inventory, NewDayEvent, PlantRegistry, PlantTypeId};

pub const KEY_GARDEN: &str = "verdant_garden";
pub const KEY_JOURNAL: &str = "verdant_journal";
pub const KEY_INVENTORY: &str = "verdant_inventory";
pub const KEY_MARKET: &str = "verdant_market";
pub const KEY_OBSTACLES: &str = "verdant_obstacles";

/// Request a full save of every subsystem.
#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent;

/// Request a full reload from the store, replacing live state.
#[derive(Event, Debug, Clone)]
pub struct LoadRequestEvent;

/// Day counter and market state share one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MarketSave {
    day: u32,
    trending: Option<PlantTypeId>,
    last_update_day: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// SNAPSHOT STORE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource)]
pub enum SnapshotStore {
    /// Test backend; nothing leaves the process.
    Memory(HashMap<String, String>),
    /// One `<key>.json` file per key under a saves directory.
    #[cfg(not(target_arch = "wasm32"))]
    Dir(std::path::PathBuf),
    /// Browser localStorage.
    #[cfg(target_arch = "wasm32")]
    LocalStorage,
}

impl Default for SnapshotStore {
    #[cfg(not(target_arch = "wasm32"))]
    fn default() -> Self {
        SnapshotStore::Dir(std::path::PathBuf::from("saves"))
    }

    #[cfg(target_arch = "wasm32")]
    fn default() -> Self {
        SnapshotStore::LocalStorage
    }
}

impl SnapshotStore {
    pub fn memory() -> Self {
        SnapshotStore::Memory(HashMap::new())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            SnapshotStore::Memory(map) => map.get(key).cloned(),
            #[cfg(not(target_arch = "wasm32"))]
            SnapshotStore::Dir(dir) => std::fs::read_to_string(dir.join(format!("{key}.json"))).ok(),
            #[cfg(target_arch = "wasm32")]
            SnapshotStore::LocalStorage => local_storage()?.get_item(key).ok().flatten(),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match self {
            SnapshotStore::Memory(map) => {
                map.insert(key.to_string(), value.to_string());
                Ok(())
            }
            #[cfg(not(target_arch = "wasm32"))]
            SnapshotStore::Dir(dir) => {
                std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
                std::fs::write(dir.join(format!("{key}.json")), value).map_err(|e| e.to_string())
            }
            #[cfg(target_arch = "wasm32")]
            SnapshotStore::LocalStorage => local_storage()
                .ok_or_else(|| "localStorage unavailable".to_string())?
                .set_item(key, value)
                .map_err(|_| format!("localStorage write failed for {key}")),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Parse a stored snapshot. Absent key → None silently; malformed
/// JSON → warn and None, so the subsystem starts fresh.
fn load_snapshot<T: DeserializeOwned>(store: &SnapshotStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("corrupt snapshot under {key:?}, starting fresh: {err}");
            None
        }
    }
}

fn store_snapshot<T: Serialize>(
    store: &mut SnapshotStore,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.set(key, &json)
}

// ═══════════════════════════════════════════════════════════════════════
// SAVE / LOAD
// ═══════════════════════════════════════════════════════════════════════

#[allow(clippy::too_many_arguments)]
pub fn save_all(
    store: &mut SnapshotStore,
    garden: &Garden,
    journal: &Journal,
    inventory: &Inventory,
    market: &Market,
    cycle: &DayCycle,
    obstacles: &ObstacleField,
) -> Result<(), String> {
    store_snapshot(store, KEY_GARDEN, &garden.snapshot())?;
    store_snapshot(store, KEY_JOURNAL, journal)?;
    store_snapshot(store, KEY_INVENTORY, inventory)?;
    store_snapshot(
        store,
        KEY_MARKET,
        &MarketSave {
            day: cycle.day,
            trending: market.trending.clone(),
            last_update_day: market.last_update_day,
        },
    )?;
    store_snapshot(store, KEY_OBSTACLES, &obstacles.snapshot())?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn load_all(
    store: &SnapshotStore,
    registry: &PlantRegistry,
    garden: &mut Garden,
    journal: &mut Journal,
    inventory: &mut Inventory,
    market: &mut Market,
    cycle: &mut DayCycle,
    obstacles: &mut ObstacleField,
) {
    if let Some(snap) = load_snapshot::<GardenSnapshot>(store, KEY_GARDEN) {
        *garden = Garden::from_snapshot(&snap, registry);
    }
    if let Some(snap) = load_snapshot::<Journal>(store, KEY_JOURNAL) {
        *journal = snap;
    }
    if let Some(snap) = load_snapshot::<Inventory>(store, KEY_INVENTORY) {
        *inventory = snap;
    }
    if let Some(snap) = load_snapshot::<MarketSave>(store, KEY_MARKET) {
        cycle.set_day(snap.day);
        market.trending = snap.trending;
        market.last_update_day = snap.last_update_day;
    }
    if let Some(snap) = load_snapshot::<ObstacleSnapshot>(store, KEY_OBSTACLES) {
        *obstacles = ObstacleField::from_snapshot(&snap, obstacles.config.clone());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN & SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SnapshotStore>()
            .add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_systems(OnEnter(GameState::Playing), load_on_startup)
            .add_systems(
                Update,
                (handle_save_request, handle_load_request, autosave_on_new_day)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct SaveTargets<'w> {
    garden: ResMut<'w, Garden>,
    journal: ResMut<'w, Journal>,
    inventory: ResMut<'w, Inventory>,
    market: ResMut<'w, Market>,
    cycle: ResMut<'w, DayCycle>,
    obstacles: ResMut<'w, ObstacleField>,
}

fn load_on_startup(
    store: Res<SnapshotStore>,
    registry: Res<PlantRegistry>,
    mut targets: SaveTargets,
) {
    load_all(
        &store,
        &registry,
        &mut targets.garden,
        &mut targets.journal,
        &mut targets.inventory,
        &mut targets.market,
        &mut targets.cycle,
        &mut targets.obstacles,
    );
    info!(
        "save loaded: day {}, {} plants",
        targets.cycle.day,
        targets.garden.plant_count()
    );
}

fn handle_save_request(
    mut events: EventReader<SaveRequestEvent>,
    mut store: ResMut<SnapshotStore>,
    targets: SaveTargets,
) {
    if events.read().next().is_none() {
        return;
    }
    match save_all(
        &mut store,
        &targets.garden,
        &targets.journal,
        &targets.inventory,
        &targets.market,
        &targets.cycle,
        &targets.obstacles,
    ) {
        Ok(()) => info!("game saved"),
        Err(err) => warn!("save failed: {err}"),
    }
}

fn handle_load_request(
    mut events: EventReader<LoadRequestEvent>,
    store: Res<SnapshotStore>,
    registry: Res<PlantRegistry>,
    mut targets: SaveTargets,
) {
    if events.read().next().is_none() {
        return;
    }
    load_all(
        &store,
        &registry,
        &mut targets.garden,
        &mut targets.journal,
        &mut targets.inventory,
        &mut targets.market,
        &mut targets.cycle,
        &mut targets.obstacles,
    );
    info!("game reloaded from store");
}

fn autosave_on_new_day(
    mut events: EventReader<NewDayEvent>,
    mut store: ResMut<SnapshotStore>,
    targets: SaveTargets,
) {
    for event in events.read() {
        if let Err(err) = save_all(
            &mut store,
            &targets.garden,
            &targets.journal,
            &targets.inventory,
            &targets.market,
            &targets.cycle,
            &targets.obstacles,
        ) {
            warn!("autosave on day {} failed: {err}", event.day);
        } else {
            info!("autosaved at dawn of day {}", event.day);
        }
    }
}
