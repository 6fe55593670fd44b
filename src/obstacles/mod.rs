//! Rock clusters. Every couple of minutes the field may sprout a small
//! cluster of rocks grown by randomized flood fill; rocks block
//! planting until they crumble on their own or the player chips them
//! away with the pickaxe. Rocks never land on plants, near the garden
//! edge, or inside the protected home area.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::garden::Garden;
use crate::shared::{
    GameState, GridPos, Inventory, RemoveRockEvent, SimRng, ToastEvent, CARDINAL_OFFSETS,
};

#[derive(Debug, Clone)]
pub struct ObstacleConfig {
    pub spawn_interval_secs: f32,
    pub spawn_chance: f32,
    pub max_clusters: usize,
    pub min_cluster_size: usize,
    pub max_cluster_size: usize,
    /// Probability that flood fill claims each candidate neighbor cell.
    pub growth_acceptance: f32,
    pub lifetime_secs: f32,
    /// Cells within this many tiles of the garden edge never spawn rocks.
    pub edge_margin: i32,
    /// Half-open rect (min inclusive, max exclusive) kept rock-free.
    pub protected_min: GridPos,
    pub protected_max: GridPos,
    pub pickaxe_cost: u32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            spawn_interval_secs: 120.0,
            spawn_chance: 0.4,
            max_clusters: 3,
            min_cluster_size: 2,
            max_cluster_size: 4,
            growth_acceptance: 0.7,
            lifetime_secs: 300.0,
            edge_margin: 3,
            protected_min: GridPos::new(10, 6),
            protected_max: GridPos::new(14, 10),
            pickaxe_cost: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleCluster {
    pub id: ClusterId,
    pub tiles: Vec<GridPos>,
    /// Seconds since the cluster appeared. Persisted instead of a
    /// wall-clock birth time so saves replay identically.
    pub age_secs: f32,
}

/// Result of trying to chip a rock at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveRockOutcome {
    NoRock,
    PickaxeRequired,
    Removed { cluster_cleared: bool },
}

#[derive(Resource, Debug, Clone)]
pub struct ObstacleField {
    pub config: ObstacleConfig,
    clusters: Vec<ObstacleCluster>,
    next_cluster_id: u64,
    spawn_timer_secs: f32,
    pub has_pickaxe: bool,
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self::new(ObstacleConfig::default())
    }
}

impl ObstacleField {
    pub fn new(config: ObstacleConfig) -> Self {
        Self {
            config,
            clusters: Vec::new(),
            next_cluster_id: 1,
            spawn_timer_secs: 0.0,
            has_pickaxe: false,
        }
    }

    pub fn clusters(&self) -> &[ObstacleCluster] {
        &self.clusters
    }

    pub fn has_rock_at(&self, pos: GridPos) -> bool {
        self.clusters.iter().any(|c| c.tiles.contains(&pos))
    }

    pub fn cluster_at(&self, pos: GridPos) -> Option<&ObstacleCluster> {
        self.clusters.iter().find(|c| c.tiles.contains(&pos))
    }

    fn is_spawnable(&self, pos: GridPos, garden: &Garden) -> bool {
        let (w, h) = (garden.width(), garden.height());
        let m = self.config.edge_margin;
        if pos.x < m || pos.x >= w - m || pos.y < m || pos.y >= h - m {
            return false;
        }
        let protected = pos.x >= self.config.protected_min.x
            && pos.x < self.config.protected_max.x
            && pos.y >= self.config.protected_min.y
            && pos.y < self.config.protected_max.y;
        if protected {
            return false;
        }
        garden.plant_at(pos).is_none() && !self.has_rock_at(pos)
    }

    /// Advance spawn timing and cluster ages. Expired clusters crumble
    /// whole. Returns the id of a cluster spawned this tick, if any.
    pub fn tick(&mut self, dt: f32, garden: &Garden, rng: &mut SimRng) -> Option<ClusterId> {
        for cluster in &mut self.clusters {
            cluster.age_secs += dt;
        }
        let lifetime = self.config.lifetime_secs;
        self.clusters.retain(|c| {
            if c.age_secs >= lifetime {
                debug!("cluster {:?} crumbled after {lifetime}s", c.id);
                false
            } else {
                true
            }
        });

        self.spawn_timer_secs += dt;
        if self.spawn_timer_secs < self.config.spawn_interval_secs {
            return None;
        }
        self.spawn_timer_secs = 0.0;

        if self.clusters.len() >= self.config.max_clusters {
            return None;
        }
        if rng.0.gen::<f32>() >= self.config.spawn_chance {
            return None;
        }
        self.try_spawn_cluster(garden, rng)
    }

    /// Grow a cluster by randomized flood fill from a random seed cell.
    /// An undersized result is rejected entirely rather than placed.
    pub fn try_spawn_cluster(&mut self, garden: &Garden, rng: &mut SimRng) -> Option<ClusterId> {
        let seed = self.pick_seed_cell(garden, rng)?;
        let target_size = rng
            .0
            .gen_range(self.config.min_cluster_size..=self.config.max_cluster_size);

        let mut tiles = vec![seed];
        let mut claimed: HashSet<GridPos> = HashSet::from([seed]);
        let mut frontier = vec![seed];

        'grow: while tiles.len() < target_size {
            let Some(current) = frontier.pop() else {
                break;
            };
            for (dx, dy) in CARDINAL_OFFSETS {
                let candidate = current.offset(dx, dy);
                if claimed.contains(&candidate) || !self.is_spawnable(candidate, garden) {
                    continue;
                }
                if rng.0.gen::<f32>() < self.config.growth_acceptance {
                    claimed.insert(candidate);
                    tiles.push(candidate);
                    frontier.push(candidate);
                    if tiles.len() >= target_size {
                        break 'grow;
                    }
                }
            }
        }

        if tiles.len() < self.config.min_cluster_size {
            debug!("rejected undersized rock cluster ({} tiles)", tiles.len());
            return None;
        }

        let id = ClusterId(self.next_cluster_id);
        self.next_cluster_id += 1;
        info!("rock cluster {:?} appeared, {} tiles", id, tiles.len());
        self.clusters.push(ObstacleCluster {
            id,
            tiles,
            age_secs: 0.0,
        });
        Some(id)
    }

    fn pick_seed_cell(&self, garden: &Garden, rng: &mut SimRng) -> Option<GridPos> {
        for _ in 0..30 {
            let pos = GridPos::new(
                rng.0.gen_range(0..garden.width()),
                rng.0.gen_range(0..garden.height()),
            );
            if self.is_spawnable(pos, garden) {
                return Some(pos);
            }
        }
        None
    }

    /// Chip one rock off whichever cluster owns the cell. Requires the
    /// pickaxe; a cluster whose last rock is removed disappears.
    pub fn remove_rock(&mut self, pos: GridPos) -> RemoveRockOutcome {
        let Some(cluster_idx) = self.clusters.iter().position(|c| c.tiles.contains(&pos)) else {
            return RemoveRockOutcome::NoRock;
        };
        if !self.has_pickaxe {
            return RemoveRockOutcome::PickaxeRequired;
        }

        let cluster = &mut self.clusters[cluster_idx];
        cluster.tiles.retain(|&t| t != pos);
        let cluster_cleared = cluster.tiles.is_empty();
        if cluster_cleared {
            self.clusters.remove(cluster_idx);
        }
        RemoveRockOutcome::Removed { cluster_cleared }
    }

    /// One-time pickaxe purchase. False when already owned or gold is
    /// short; the inventory is untouched then.
    pub fn buy_pickaxe(&mut self, inventory: &mut Inventory) -> bool {
        if self.has_pickaxe {
            return false;
        }
        if !inventory.spend_gold(self.config.pickaxe_cost) {
            return false;
        }
        self.has_pickaxe = true;
        true
    }

    pub fn snapshot(&self) -> ObstacleSnapshot {
        ObstacleSnapshot {
            clusters: self.clusters.clone(),
            has_pickaxe: self.has_pickaxe,
        }
    }

    pub fn from_snapshot(snap: &ObstacleSnapshot, config: ObstacleConfig) -> Self {
        let next_cluster_id = snap
            .clusters
            .iter()
            .map(|c| c.id.0 + 1)
            .max()
            .unwrap_or(1);
        Self {
            config,
            clusters: snap.clusters.clone(),
            next_cluster_id,
            spawn_timer_secs: 0.0,
            has_pickaxe: snap.has_pickaxe,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub clusters: Vec<ObstacleCluster>,
    pub has_pickaxe: bool,
}

pub struct ObstaclePlugin;

impl Plugin for ObstaclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObstacleField>().add_systems(
            Update,
            (tick_obstacles, handle_remove_rock).run_if(in_state(GameState::Playing)),
        );
    }
}

fn tick_obstacles(
    time: Res<Time>,
    mut field: ResMut<ObstacleField>,
    garden: Res<Garden>,
    mut rng: ResMut<SimRng>,
    mut toasts: EventWriter<ToastEvent>,
) {
    if field.tick(time.delta_secs(), &garden, &mut rng).is_some() {
        toasts.send(ToastEvent {
            message: "Rocks have tumbled into the garden!".to_string(),
            duration_secs: 3.0,
        });
    }
}

fn handle_remove_rock(
    mut events: EventReader<RemoveRockEvent>,
    mut field: ResMut<ObstacleField>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in events.read() {
        match field.remove_rock(event.pos) {
            RemoveRockOutcome::NoRock => {
                debug!("no rock at ({}, {})", event.pos.x, event.pos.y);
            }
            RemoveRockOutcome::PickaxeRequired => {
                toasts.send(ToastEvent {
                    message: "You need a pickaxe to break rocks.".to_string(),
                    duration_secs: 3.0,
                });
            }
            RemoveRockOutcome::Removed { cluster_cleared } => {
                info!(
                    "rock removed at ({}, {}), cluster cleared: {cluster_cleared}",
                    event.pos.x, event.pos.y
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::plants::populate_plants;
    use crate::shared::PlantRegistry;

    fn registry() -> PlantRegistry {
        let mut registry = PlantRegistry::default();
        populate_plants(&mut registry);
        registry
    }

    fn spawn_one(field: &mut ObstacleField, garden: &Garden, rng: &mut SimRng) -> ClusterId {
        for _ in 0..50 {
            if let Some(id) = field.try_spawn_cluster(garden, rng) {
                return id;
            }
        }
        panic!("no cluster spawned in 50 attempts");
    }

    #[test]
    fn clusters_respect_margins_and_protected_rect() {
        let garden = Garden::default();
        let mut field = ObstacleField::default();
        let mut rng = SimRng::seeded(17);

        for _ in 0..20 {
            field.try_spawn_cluster(&garden, &mut rng);
            // keep spawning fresh fields so max_clusters never caps us
            for cluster in field.clusters() {
                for tile in &cluster.tiles {
                    assert!(tile.x >= 3 && tile.x < garden.width() - 3, "{tile:?}");
                    assert!(tile.y >= 3 && tile.y < garden.height() - 3, "{tile:?}");
                    let in_protected =
                        (10..14).contains(&tile.x) && (6..10).contains(&tile.y);
                    assert!(!in_protected, "{tile:?} inside the protected area");
                }
            }
            field = ObstacleField::default();
        }
    }

    #[test]
    fn cluster_sizes_stay_within_bounds_and_tiles_are_connected() {
        let garden = Garden::default();

        for seed in 0..20u64 {
            let mut field = ObstacleField::default();
            let mut rng_local = SimRng::seeded(seed);
            let id = spawn_one(&mut field, &garden, &mut rng_local);
            let cluster = field
                .clusters()
                .iter()
                .find(|c| c.id == id)
                .unwrap()
                .clone();

            assert!(cluster.tiles.len() >= 2 && cluster.tiles.len() <= 4);

            // Connectivity under the 4-neighborhood.
            let tiles: HashSet<GridPos> = cluster.tiles.iter().copied().collect();
            let mut reached = HashSet::from([cluster.tiles[0]]);
            let mut frontier = vec![cluster.tiles[0]];
            while let Some(current) = frontier.pop() {
                for (dx, dy) in CARDINAL_OFFSETS {
                    let next = current.offset(dx, dy);
                    if tiles.contains(&next) && reached.insert(next) {
                        frontier.push(next);
                    }
                }
            }
            assert_eq!(reached.len(), tiles.len(), "cluster must be connected");
        }
    }

    #[test]
    fn rocks_never_overlap_plants() {
        let registry = registry();
        let mut garden = Garden::default();
        // Carpet the middle of the field with plants, leaving little
        // free space.
        for y in 3..garden.height() - 3 {
            for x in 3..garden.width() - 3 {
                garden.plant_seed("sunflower", GridPos::new(x, y), &registry);
            }
        }

        let mut field = ObstacleField::default();
        let mut rng = SimRng::seeded(31);
        for _ in 0..50 {
            field.try_spawn_cluster(&garden, &mut rng);
        }
        for cluster in field.clusters() {
            for tile in &cluster.tiles {
                assert!(garden.plant_at(*tile).is_none());
            }
        }
    }

    #[test]
    fn removal_requires_the_pickaxe() {
        let garden = Garden::default();
        let mut field = ObstacleField::default();
        let mut rng = SimRng::seeded(41);
        let id = spawn_one(&mut field, &garden, &mut rng);
        let tile = field.clusters().iter().find(|c| c.id == id).unwrap().tiles[0];

        assert_eq!(field.remove_rock(tile), RemoveRockOutcome::PickaxeRequired);
        assert!(field.has_rock_at(tile));

        field.has_pickaxe = true;
        assert!(matches!(
            field.remove_rock(tile),
            RemoveRockOutcome::Removed { .. }
        ));
        assert!(!field.has_rock_at(tile));
        assert_eq!(
            field.remove_rock(GridPos::new(0, 0)),
            RemoveRockOutcome::NoRock
        );
    }

    #[test]
    fn clearing_the_last_rock_deletes_the_cluster() {
        let garden = Garden::default();
        let mut field = ObstacleField::default();
        let mut rng = SimRng::seeded(43);
        let id = spawn_one(&mut field, &garden, &mut rng);
        field.has_pickaxe = true;

        let tiles = field
            .clusters()
            .iter()
            .find(|c| c.id == id)
            .unwrap()
            .tiles
            .clone();
        for (i, tile) in tiles.iter().enumerate() {
            let last = i == tiles.len() - 1;
            assert_eq!(
                field.remove_rock(*tile),
                RemoveRockOutcome::Removed {
                    cluster_cleared: last
                }
            );
        }
        assert!(field.clusters().is_empty());
    }

    #[test]
    fn clusters_crumble_after_their_lifetime() {
        let garden = Garden::default();
        let mut field = ObstacleField::default();
        let mut rng = SimRng::seeded(47);
        spawn_one(&mut field, &garden, &mut rng);
        assert_eq!(field.clusters().len(), 1);

        // Keep interval spawn checks from muddying the count.
        field.config.spawn_chance = 0.0;
        field.tick(299.0, &garden, &mut rng);
        assert_eq!(field.clusters().len(), 1);
        field.tick(2.0, &garden, &mut rng);
        assert!(field.clusters().is_empty());
    }

    #[test]
    fn spawn_checks_happen_on_the_interval_and_respect_the_cap() {
        let garden = Garden::default();
        let mut field = ObstacleField::default();
        let mut rng = SimRng::seeded(53);

        // Force certainty so every interval check spawns.
        field.config.spawn_chance = 1.1;
        field.config.lifetime_secs = f32::MAX;

        assert!(field.tick(119.0, &garden, &mut rng).is_none());
        assert!(field.tick(2.0, &garden, &mut rng).is_some());

        for _ in 0..10 {
            field.tick(121.0, &garden, &mut rng);
        }
        assert_eq!(field.clusters().len(), field.config.max_clusters);
    }

    #[test]
    fn pickaxe_purchase_spends_gold_once() {
        let mut field = ObstacleField::default();
        let mut inventory = Inventory::default();

        assert!(!field.buy_pickaxe(&mut inventory), "100 gold is not enough");
        assert_eq!(inventory.gold, 100);

        inventory.gold = 1200;
        assert!(field.buy_pickaxe(&mut inventory));
        assert_eq!(inventory.gold, 200);
        assert!(field.has_pickaxe);

        assert!(!field.buy_pickaxe(&mut inventory), "already owned");
        assert_eq!(inventory.gold, 200);
    }

    #[test]
    fn obstacle_snapshot_roundtrip_preserves_age_and_pickaxe() {
        let garden = Garden::default();
        let mut field = ObstacleField::default();
        let mut rng = SimRng::seeded(59);
        spawn_one(&mut field, &garden, &mut rng);
        field.has_pickaxe = true;
        field.tick(50.0, &garden, &mut rng);

        let snap = field.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let parsed: ObstacleSnapshot = serde_json::from_str(&json).unwrap();
        let restored = ObstacleField::from_snapshot(&parsed, ObstacleConfig::default());

        assert!(restored.has_pickaxe);
        assert_eq!(restored.clusters().len(), 1);
        assert!(restored.clusters()[0].age_secs >= 50.0);
        // New clusters keep getting fresh ids.
        assert!(restored.next_cluster_id > restored.clusters()[0].id.0);
    }
}
