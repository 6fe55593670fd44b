//! Shared types, resources, events, and states for Verdant.
//!
//! This is the type contract. Every domain plugin imports from here;
//! cross-domain communication happens through the events and resources
//! defined in this module.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// GRID
// ═══════════════════════════════════════════════════════════════════════

/// A cell on the garden grid. The same coordinate space is shared by
/// plants and obstacle clusters; the two occupancy sets never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Moore neighborhood offsets, in the fixed scan order used everywhere
/// neighbors are enumerated. Mutation rolls depend on this order being
/// stable, so tests with a seeded RNG stay deterministic.
pub const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Von Neumann (4-way) offsets, used by obstacle cluster growth.
pub const CARDINAL_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

// ═══════════════════════════════════════════════════════════════════════
// PLANT TYPES — static registry
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for every plant type. String IDs keep the registry
/// data-driven; variant registration adds new IDs at startup.
pub type PlantTypeId = String;

/// Companion list entry meaning "companionable with every type".
pub const WILDCARD_COMPANION: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Static descriptor for one plant type. Read-only after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantDef {
    pub id: PlantTypeId,
    pub name: String,
    pub emoji: String,
    /// Seconds a stage takes at base rate (progress runs 0..100 per stage).
    pub growth_time_secs: f32,
    /// Types this plant grants/receives a bonus next to. May contain
    /// [`WILDCARD_COMPANION`].
    pub companions: Vec<PlantTypeId>,
    /// Crops produced per harvest.
    pub harvest_yield: u32,
    /// Gold cost of one seed. None = not purchasable (mutation-only).
    pub seed_price: Option<u32>,
    /// Base gold value of one harvested crop.
    pub sell_price: u32,
    /// For mutated variants: the base type this variant derives from.
    pub base_id: Option<PlantTypeId>,
    pub rarity: Rarity,
}

impl PlantDef {
    /// Variants are obtained through cross-breeding and cannot breed further.
    pub fn is_variant(&self) -> bool {
        self.base_id.is_some()
    }

    /// Whether this type considers `other` a companion.
    pub fn is_companion_of(&self, other: &str) -> bool {
        self.companions
            .iter()
            .any(|c| c == WILDCARD_COMPANION || c == other)
    }
}

/// Registry of all plant types. Populated once during `GameState::Loading`;
/// variant registration is additive only and never overwrites an entry.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlantRegistry {
    pub plants: HashMap<PlantTypeId, PlantDef>,
}

impl PlantRegistry {
    pub fn get(&self, id: &str) -> Option<&PlantDef> {
        self.plants.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.plants.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn insert(&mut self, def: PlantDef) {
        self.plants.insert(def.id.clone(), def);
    }

    /// Additive registration for mutation variants. Returns false (and
    /// leaves the registry untouched) when the id is already taken.
    pub fn register_variant(&mut self, def: PlantDef) -> bool {
        if self.plants.contains_key(&def.id) {
            return false;
        }
        self.plants.insert(def.id.clone(), def);
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GROWTH STATE MACHINE
// ═══════════════════════════════════════════════════════════════════════

/// Growth stages, strictly ordered. No skipping, no regression; the only
/// way out of the last stage is harvesting, which destroys the plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrowthStage {
    Seed,
    Sprout,
    Growing,
    Blooming,
    FullGrown,
    ReadyToHarvest,
}

impl GrowthStage {
    pub fn next(self) -> Option<Self> {
        match self {
            GrowthStage::Seed => Some(GrowthStage::Sprout),
            GrowthStage::Sprout => Some(GrowthStage::Growing),
            GrowthStage::Growing => Some(GrowthStage::Blooming),
            GrowthStage::Blooming => Some(GrowthStage::FullGrown),
            GrowthStage::FullGrown => Some(GrowthStage::ReadyToHarvest),
            GrowthStage::ReadyToHarvest => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            GrowthStage::Seed => 0,
            GrowthStage::Sprout => 1,
            GrowthStage::Growing => 2,
            GrowthStage::Blooming => 3,
            GrowthStage::FullGrown => 4,
            GrowthStage::ReadyToHarvest => 5,
        }
    }

    /// FullGrown and ReadyToHarvest: growth has terminated, wetness no
    /// longer decays, and watering becomes a cosmetic no-op.
    pub fn is_terminal(self) -> bool {
        matches!(self, GrowthStage::FullGrown | GrowthStage::ReadyToHarvest)
    }
}

/// Water sub-state, derived from soil wetness. Paused never kills a
/// plant — it only stops progress until the plant is watered again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaterStatus {
    Watered,
    Paused,
}

// ═══════════════════════════════════════════════════════════════════════
// INVENTORY
// ═══════════════════════════════════════════════════════════════════════

/// Gold, seeds, and harvested crops. No capacity limits — stress-free by
/// design. Granting and spending both go through the methods so callers
/// get a uniform success/failure signal.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub gold: u32,
    pub seeds: HashMap<PlantTypeId, u32>,
    pub crops: HashMap<PlantTypeId, u32>,
}

impl Default for Inventory {
    fn default() -> Self {
        let mut seeds = HashMap::new();
        seeds.insert("tomato".to_string(), 5);
        seeds.insert("sunflower".to_string(), 3);
        seeds.insert("tulip".to_string(), 2);
        seeds.insert("carrot".to_string(), 3);
        seeds.insert("basil".to_string(), 4);

        Self {
            gold: 100,
            seeds,
            crops: HashMap::new(),
        }
    }
}

impl Inventory {
    pub fn seed_count(&self, type_id: &str) -> u32 {
        self.seeds.get(type_id).copied().unwrap_or(0)
    }

    pub fn crop_count(&self, type_id: &str) -> u32 {
        self.crops.get(type_id).copied().unwrap_or(0)
    }

    pub fn add_seeds(&mut self, type_id: &str, amount: u32) {
        *self.seeds.entry(type_id.to_string()).or_insert(0) += amount;
    }

    /// Consume one seed for planting. Returns false when none are held.
    pub fn use_seed(&mut self, type_id: &str) -> bool {
        match self.seeds.get_mut(type_id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn add_crops(&mut self, type_id: &str, amount: u32) {
        *self.crops.entry(type_id.to_string()).or_insert(0) += amount;
    }

    /// Remove harvested crops (selling). Returns how many were removed.
    pub fn take_crops(&mut self, type_id: &str, amount: u32) -> u32 {
        match self.crops.get_mut(type_id) {
            Some(count) => {
                let taken = amount.min(*count);
                *count -= taken;
                taken
            }
            None => 0,
        }
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub fn spend_gold(&mut self, amount: u32) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RNG
// ═══════════════════════════════════════════════════════════════════════

use rand::rngs::StdRng;
use rand::SeedableRng;

/// The single RNG all simulation systems draw from. Constructed from a
/// fixed seed in tests so mutation rolls and obstacle spawns replay
/// identically.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Request to plant a seed of the given type at a cell. Consumes one
/// seed from the inventory on success; silently no-ops otherwise.
#[derive(Event, Debug, Clone)]
pub struct PlantSeedEvent {
    pub type_id: PlantTypeId,
    pub pos: GridPos,
}

/// Request to water the plant at a cell.
#[derive(Event, Debug, Clone)]
pub struct WaterPlantEvent {
    pub pos: GridPos,
}

/// Request to harvest the plant at a cell. Only succeeds for plants in
/// `ReadyToHarvest`; anything else is a logged no-op.
#[derive(Event, Debug, Clone)]
pub struct HarvestAttemptEvent {
    pub pos: GridPos,
}

/// Request to chip one rock cell off an obstacle cluster.
#[derive(Event, Debug, Clone)]
pub struct RemoveRockEvent {
    pub pos: GridPos,
}

/// A plant was harvested and removed from the garden.
#[derive(Event, Debug, Clone)]
pub struct PlantHarvestedEvent {
    pub type_id: PlantTypeId,
    pub amount: u32,
    pub pos: GridPos,
}

/// Cross-breeding succeeded: a variant seed was granted.
#[derive(Event, Debug, Clone)]
pub struct MutationEvent {
    pub variant_id: PlantTypeId,
    /// The harvested type that triggered the roll.
    pub parent_id: PlantTypeId,
    /// The neighboring type that completed the pair.
    pub partner_id: PlantTypeId,
    pub rarity: Rarity,
    pub pos: GridPos,
}

/// A plant type's mastery tier increased.
#[derive(Event, Debug, Clone)]
pub struct MasteryLevelUpEvent {
    pub type_id: PlantTypeId,
    pub new_level: u8,
    pub description: String,
}

/// The day counter advanced (drives market refresh and autosave).
#[derive(Event, Debug, Clone)]
pub struct NewDayEvent {
    pub day: u32,
}

/// Summon the rain cloud: waters everything and doubles growth while
/// it lasts.
#[derive(Event, Debug, Clone)]
pub struct StartRainEvent;

/// Transient player-facing notification. Consumed by the (external)
/// presentation layer; the core only emits these.
#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const DEFAULT_GRID_WIDTH: i32 = 25;
pub const DEFAULT_GRID_HEIGHT: i32 = 17;

/// Soil wetness lost per second while growth is live.
pub const WETNESS_DECAY_PER_SEC: f32 = 0.02;
/// Below this wetness a plant pauses until watered.
pub const WETNESS_PAUSE_THRESHOLD: f32 = 0.3;
/// Growth-rate increase per qualifying neighbor.
pub const NEIGHBOR_BONUS_PER_PLANT: f32 = 0.1;
/// Progress needed to advance one growth stage.
pub const STAGE_PROGRESS_MAX: f32 = 100.0;

/// Seconds the watering wiggle effect stays visible.
pub const WIGGLE_EFFECT_SECS: f64 = 0.5;
/// Seconds the stage-advance scale pulse stays visible.
pub const PULSE_EFFECT_SECS: f64 = 0.3;

// ═══════════════════════════════════════════════════════════════════════
// TIME
// ═══════════════════════════════════════════════════════════════════════

/// Unix timestamp in seconds. Journal entries record discovery and
/// harvest times with this; wasm builds have no wall clock here, so 0.
#[cfg(not(target_arch = "wasm32"))]
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
pub fn current_timestamp() -> u64 {
    0
}
