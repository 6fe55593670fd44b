//! The garden grid: single source of truth for plant occupancy.
//!
//! Owns every plant, enforces one-plant-per-cell, and recomputes the
//! companion neighbor bonuses after every structural change so the
//! bonus of a plant depends only on final occupancy, never on the
//! order cells were filled in.

use bevy::log::debug;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use super::plant::{Plant, PlantId, PlantSnapshot};
use crate::shared::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenStats {
    /// Seeds planted over the garden's lifetime (not current occupancy).
    pub total_planted: u64,
    /// Plants currently at FullGrown or ReadyToHarvest.
    pub fully_grown: u64,
    /// Successful watering actions.
    pub water_given: u64,
}

/// A candidate cell for planting, scored by the bonus the type would
/// receive there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation {
    pub pos: GridPos,
    pub bonus: u32,
}

#[derive(Resource, Debug, Clone)]
pub struct Garden {
    width: i32,
    height: i32,
    /// Row-major cell → occupying plant. Invariant: `grid[y*w+x]` is
    /// Some(id) iff `plants` holds a plant with that id at (x, y).
    grid: Vec<Option<PlantId>>,
    /// Insertion-ordered plant list for fast iteration.
    plants: Vec<Plant>,
    next_plant_id: u64,
    pub stats: GardenStats,
    /// Simulation clock in seconds, advanced by update(). Cosmetic
    /// effect expiries are stamped against this.
    pub elapsed: f64,
}

impl Default for Garden {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}

impl Garden {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "garden dimensions must be positive");
        Self {
            width,
            height,
            grid: vec![None; (width * height) as usize],
            plants: Vec::new(),
            next_plant_id: 1,
            stats: GardenStats::default(),
            elapsed: 0.0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    pub fn plants(&self) -> impl Iterator<Item = &Plant> {
        self.plants.iter()
    }

    pub fn plants_mut(&mut self) -> impl Iterator<Item = &mut Plant> {
        self.plants.iter_mut()
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Out-of-bounds cells count as occupied, matching every placement
    /// check in the simulation.
    pub fn is_cell_empty(&self, pos: GridPos) -> bool {
        self.in_bounds(pos) && self.cell(pos).is_none()
    }

    fn cell(&self, pos: GridPos) -> Option<PlantId> {
        self.grid[(pos.y * self.width + pos.x) as usize]
    }

    fn cell_mut(&mut self, pos: GridPos) -> &mut Option<PlantId> {
        &mut self.grid[(pos.y * self.width + pos.x) as usize]
    }

    fn index_of(&self, id: PlantId) -> Option<usize> {
        self.plants.iter().position(|p| p.id == id)
    }

    pub fn plant_at(&self, pos: GridPos) -> Option<&Plant> {
        if !self.in_bounds(pos) {
            return None;
        }
        let id = self.cell(pos)?;
        let idx = self.index_of(id)?;
        Some(&self.plants[idx])
    }

    pub fn plant_at_mut(&mut self, pos: GridPos) -> Option<&mut Plant> {
        if !self.in_bounds(pos) {
            return None;
        }
        let id = self.cell(pos)?;
        let idx = self.index_of(id)?;
        Some(&mut self.plants[idx])
    }

    // ───────────────────────────────────────────────────────────────────
    // Structural changes
    // ───────────────────────────────────────────────────────────────────

    /// Plant a seed. Returns None — without touching any state — when
    /// the cell is out of bounds or occupied, or the type is unknown.
    /// On success the full neighbor-bonus recalculation runs: the new
    /// plant may grant bonuses to existing neighbors, not just gain one.
    pub fn plant_seed(
        &mut self,
        type_id: &str,
        pos: GridPos,
        registry: &PlantRegistry,
    ) -> Option<PlantId> {
        if !self.in_bounds(pos) {
            debug!("plant_seed rejected: ({}, {}) out of bounds", pos.x, pos.y);
            return None;
        }
        if self.cell(pos).is_some() {
            debug!("plant_seed rejected: ({}, {}) already occupied", pos.x, pos.y);
            return None;
        }
        let Some(def) = registry.get(type_id) else {
            debug!("plant_seed rejected: unknown type {type_id:?}");
            return None;
        };

        let id = PlantId(self.next_plant_id);
        self.next_plant_id += 1;

        let plant = Plant::new(id, def, pos);
        *self.cell_mut(pos) = Some(id);
        self.plants.push(plant);
        self.stats.total_planted += 1;

        self.recalculate_all_neighbor_bonuses(registry);
        Some(id)
    }

    /// Detach and return the plant at a cell. None when the cell is
    /// empty or out of bounds; grid state is untouched in that case.
    pub fn remove_plant(&mut self, pos: GridPos, registry: &PlantRegistry) -> Option<Plant> {
        if !self.in_bounds(pos) {
            return None;
        }
        let id = self.cell(pos)?;
        let idx = self.index_of(id)?;

        *self.cell_mut(pos) = None;
        let plant = self.plants.remove(idx);

        self.recalculate_all_neighbor_bonuses(registry);
        Some(plant)
    }

    /// Water the plant at a cell. False only when the cell is empty;
    /// watering an existing plant always succeeds and counts, even
    /// when growth has terminated and only the feedback fires.
    pub fn water_plant_at(&mut self, pos: GridPos) -> bool {
        let now = self.elapsed;
        let Some(plant) = self.plant_at_mut(pos) else {
            debug!("water rejected: no plant at ({}, {})", pos.x, pos.y);
            return false;
        };
        plant.water(now);
        self.stats.water_given += 1;
        true
    }

    // ───────────────────────────────────────────────────────────────────
    // Neighbors & companion bonuses
    // ───────────────────────────────────────────────────────────────────

    /// Plants in the Moore neighborhood of a cell, in the fixed offset
    /// order. No wraparound; out-of-bounds cells are skipped.
    pub fn neighbors(&self, pos: GridPos) -> Vec<&Plant> {
        let mut result = Vec::new();
        for (dx, dy) in MOORE_OFFSETS {
            if let Some(plant) = self.plant_at(pos.offset(dx, dy)) {
                result.push(plant);
            }
        }
        result
    }

    /// Bonus a plant of `type_id` receives at `pos` under the symmetric
    /// companionship rule: a neighbor qualifies when either side lists
    /// the other (or a wildcard). Each qualifying neighbor contributes
    /// exactly +1 no matter how many ways it qualifies.
    pub fn neighbor_bonus_at(&self, pos: GridPos, type_id: &str, registry: &PlantRegistry) -> u32 {
        let Some(def) = registry.get(type_id) else {
            return 0;
        };
        let mut bonus = 0;
        for neighbor in self.neighbors(pos) {
            if def.is_companion_of(&neighbor.type_id) {
                bonus += 1;
            } else if registry
                .get(&neighbor.type_id)
                .is_some_and(|n| n.is_companion_of(type_id))
            {
                bonus += 1;
            }
        }
        bonus
    }

    /// Recompute every plant's neighbor bonus from current occupancy.
    /// O(P × 8); deterministic and order-independent, since each bonus
    /// reads only final occupancy.
    pub fn recalculate_all_neighbor_bonuses(&mut self, registry: &PlantRegistry) {
        let bonuses: Vec<u32> = self
            .plants
            .iter()
            .map(|p| self.neighbor_bonus_at(p.pos, &p.type_id, registry))
            .collect();
        for (plant, bonus) in self.plants.iter_mut().zip(bonuses) {
            plant.neighbor_bonus = bonus;
        }
    }

    /// Empty cells where planting `type_id` would start with a bonus,
    /// sorted descending. Placement assistance only: the check here is
    /// one-directional (would the candidate type consider the existing
    /// neighbor a companion), and the scan is side-effect free.
    pub fn recommended_positions(&self, type_id: &str, registry: &PlantRegistry) -> Vec<Recommendation> {
        let Some(def) = registry.get(type_id) else {
            return Vec::new();
        };

        let mut recommendations = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = GridPos::new(x, y);
                if !self.is_cell_empty(pos) {
                    continue;
                }
                let bonus = self
                    .neighbors(pos)
                    .iter()
                    .filter(|n| def.is_companion_of(&n.type_id))
                    .count() as u32;
                if bonus > 0 {
                    recommendations.push(Recommendation { pos, bonus });
                }
            }
        }

        recommendations.sort_by(|a, b| b.bonus.cmp(&a.bonus));
        recommendations
    }

    // ───────────────────────────────────────────────────────────────────
    // Tick
    // ───────────────────────────────────────────────────────────────────

    /// Advance every plant by `dt` seconds. `multiplier_for` supplies
    /// the per-type external growth multiplier (mastery × weather).
    /// Does not promote FullGrown plants — that is the separate
    /// [`Garden::check_harvest_ready_all`] pass, sequenced after this.
    pub fn update(&mut self, dt: f32, multiplier_for: impl Fn(&str) -> f32) {
        self.elapsed += dt as f64;
        let now = self.elapsed;

        let mut fully_grown = 0;
        for plant in &mut self.plants {
            let multiplier = multiplier_for(&plant.type_id);
            plant.update(dt, now, multiplier);
            if plant.is_fully_grown() {
                fully_grown += 1;
            }
        }
        self.stats.fully_grown = fully_grown;
    }

    /// Promote every FullGrown plant to ReadyToHarvest. Idempotent.
    pub fn check_harvest_ready_all(&mut self) {
        for plant in &mut self.plants {
            plant.check_harvest_ready();
        }
    }

    /// Water every plant (rain cloud). Terminal plants just wiggle.
    pub fn water_all(&mut self) {
        let now = self.elapsed;
        for plant in &mut self.plants {
            plant.water(now);
            plant.soil_wetness = 1.0;
        }
    }

    // ───────────────────────────────────────────────────────────────────
    // Snapshot
    // ───────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> GardenSnapshot {
        GardenSnapshot {
            grid_width: self.width,
            grid_height: self.height,
            plants: self.plants.iter().map(Plant::snapshot).collect(),
            stats: self.stats,
        }
    }

    /// Rebuild a garden from a snapshot. Entries that no longer fit —
    /// unknown type, out of bounds, duplicate cell — are dropped with a
    /// log instead of failing the whole load. Bonuses are derived state
    /// and are recomputed, never restored.
    pub fn from_snapshot(snap: &GardenSnapshot, registry: &PlantRegistry) -> Self {
        let mut garden = Garden::new(snap.grid_width.max(1), snap.grid_height.max(1));
        garden.stats = snap.stats;

        for plant_snap in &snap.plants {
            let pos = GridPos::new(plant_snap.x, plant_snap.y);
            let Some(def) = registry.get(&plant_snap.type_id) else {
                debug!("load: dropping plant of unknown type {:?}", plant_snap.type_id);
                continue;
            };
            if !garden.is_cell_empty(pos) {
                debug!("load: dropping plant at occupied/invalid cell ({}, {})", pos.x, pos.y);
                continue;
            }

            let id = PlantId(garden.next_plant_id);
            garden.next_plant_id += 1;
            let plant = Plant::from_snapshot(id, def, plant_snap);
            *garden.cell_mut(pos) = Some(id);
            garden.plants.push(plant);
        }

        garden.recalculate_all_neighbor_bonuses(registry);
        garden
    }
}

/// Persisted garden state: dimensions, plants, aggregate stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GardenSnapshot {
    pub grid_width: i32,
    pub grid_height: i32,
    pub plants: Vec<PlantSnapshot>,
    pub stats: GardenStats,
}
