//! The per-cell plant entity and its growth state machine.
//!
//! A plant never dies. Running out of water pauses growth; watering
//! resumes it at the exact progress value it paused at. The only exit
//! from the state machine is harvest, which destroys the entity.

use serde::{Deserialize, Serialize};

use crate::shared::*;

/// Stable identity for a plant, unique within one garden for its whole
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlantId(pub u64);

/// Yield returned by a successful harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestResult {
    pub type_id: PlantTypeId,
    pub amount: u32,
}

#[derive(Debug, Clone)]
pub struct Plant {
    pub id: PlantId,
    pub type_id: PlantTypeId,
    /// Immutable after placement; plants are removed, never moved.
    pub pos: GridPos,
    pub stage: GrowthStage,
    pub water_status: WaterStatus,
    /// Progress within the current stage, in [0, 100).
    pub growth_progress: f32,
    /// Progress gained per second at multiplier 1.0, derived from the
    /// type's growth time.
    pub base_growth_rate: f32,
    /// Count of qualifying companion neighbors, +10% growth each.
    /// Recomputed by the garden whenever occupancy changes.
    pub neighbor_bonus: u32,
    /// Soil wetness in [0, 1], decaying over time.
    pub soil_wetness: f32,
    /// Cosmetic effect expiry timestamps against the garden clock.
    /// The rendering layer checks these each tick; they never gate
    /// state-machine transitions.
    pub wiggle_until: f64,
    pub pulse_until: f64,
}

impl Plant {
    pub fn new(id: PlantId, def: &PlantDef, pos: GridPos) -> Self {
        Self {
            id,
            type_id: def.id.clone(),
            pos,
            stage: GrowthStage::Seed,
            // Planting waters the seed for free.
            water_status: WaterStatus::Watered,
            growth_progress: 0.0,
            base_growth_rate: STAGE_PROGRESS_MAX / def.growth_time_secs,
            neighbor_bonus: 0,
            soil_wetness: 1.0,
            wiggle_until: 0.0,
            pulse_until: 0.0,
        }
    }

    pub fn is_fully_grown(&self) -> bool {
        self.stage.is_terminal()
    }

    pub fn is_ready_to_harvest(&self) -> bool {
        self.stage == GrowthStage::ReadyToHarvest
    }

    pub fn is_paused(&self) -> bool {
        self.water_status == WaterStatus::Paused
    }

    pub fn needs_water(&self) -> bool {
        self.soil_wetness < WETNESS_PAUSE_THRESHOLD
    }

    /// One simulation tick. `now` is the garden clock (seconds),
    /// `external_multiplier` folds in mastery and weather bonuses.
    ///
    /// Wetness keeps decaying while growth is merely paused, but stops
    /// once growth has terminated (FullGrown / ReadyToHarvest).
    pub fn update(&mut self, dt: f32, now: f64, external_multiplier: f32) {
        if self.stage.is_terminal() {
            return;
        }

        self.soil_wetness = (self.soil_wetness - dt * WETNESS_DECAY_PER_SEC).max(0.0);

        if self.is_paused() {
            return;
        }

        if self.needs_water() {
            self.water_status = WaterStatus::Paused;
            return;
        }

        let bonus_multiplier = 1.0 + self.neighbor_bonus as f32 * NEIGHBOR_BONUS_PER_PLANT;
        let rate = self.base_growth_rate * bonus_multiplier * external_multiplier;
        self.growth_progress += rate * dt;

        if self.growth_progress >= STAGE_PROGRESS_MAX {
            self.advance_stage(now);
        }
    }

    /// Advance one growth stage, resetting progress. Stops at FullGrown;
    /// the promotion to ReadyToHarvest is the orchestrator's explicit
    /// [`Plant::check_harvest_ready`] step.
    fn advance_stage(&mut self, now: f64) {
        if let Some(next) = self.stage.next() {
            self.stage = next;
            self.growth_progress = 0.0;
            self.pulse_until = now + PULSE_EFFECT_SECS;
        }
    }

    /// Refill the soil and resume growth. Watering always succeeds:
    /// on a terminal plant the soil is left alone and only the wiggle
    /// feedback fires, but the call still reports true.
    pub fn water(&mut self, now: f64) -> bool {
        self.wiggle_until = now + WIGGLE_EFFECT_SECS;

        if self.stage.is_terminal() {
            return true;
        }

        self.water_status = WaterStatus::Watered;
        self.soil_wetness = 1.0;
        true
    }

    /// Harvest is advisory, not punishing: in any stage other than
    /// ReadyToHarvest this returns None and changes nothing. A Some
    /// result signals the caller to destroy the entity.
    pub fn harvest(&self, def: &PlantDef) -> Option<HarvestResult> {
        if !self.is_ready_to_harvest() {
            return None;
        }
        Some(HarvestResult {
            type_id: self.type_id.clone(),
            amount: def.harvest_yield.max(1),
        })
    }

    /// Promote FullGrown to ReadyToHarvest. Idempotent; invoked once per
    /// tick by the orchestrator, sequenced after the growth update.
    pub fn check_harvest_ready(&mut self) -> bool {
        if self.stage == GrowthStage::FullGrown {
            self.stage = GrowthStage::ReadyToHarvest;
            return true;
        }
        false
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════

/// Persisted form of a plant. Neighbor bonus is derived state and is
/// never saved; the garden recomputes it after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantSnapshot {
    pub type_id: PlantTypeId,
    pub x: i32,
    pub y: i32,
    pub stage: GrowthStage,
    pub water_status: WaterStatus,
    pub growth_progress: f32,
    pub soil_wetness: f32,
}

impl Plant {
    pub fn snapshot(&self) -> PlantSnapshot {
        PlantSnapshot {
            type_id: self.type_id.clone(),
            x: self.pos.x,
            y: self.pos.y,
            stage: self.stage,
            water_status: self.water_status,
            growth_progress: self.growth_progress,
            soil_wetness: self.soil_wetness,
        }
    }

    pub fn from_snapshot(id: PlantId, def: &PlantDef, snap: &PlantSnapshot) -> Self {
        let mut plant = Plant::new(id, def, GridPos::new(snap.x, snap.y));
        plant.stage = snap.stage;
        plant.water_status = snap.water_status;
        plant.growth_progress = snap.growth_progress;
        plant.soil_wetness = snap.soil_wetness;
        plant
    }
}
