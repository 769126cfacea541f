//! Grid streamer

use std::collections::{HashMap, HashSet};

use ember_physics::{CollisionLayer, AABB};
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{CellKey, StreamingConfig, StreamingStats, StreamingUpdate};
use crate::behavior::{EnemyConfig, EnemyState};
use crate::entity::{Collider, Entity, EntityHandle, EntityKind};
use crate::error::Result;
use crate::render::{Material, RenderInfo, ShapeKind, ENEMY_TEXTURES};
use crate::world::EntityStore;

/// Global sub-grid coordinate of an obstacle slot
type SubCell = (i32, i32);

/// Bookkeeping for one active cell
#[derive(Debug, Clone, Default)]
struct ActiveCell {
    /// Sub-grid slots this cell populated
    occupied: Vec<SubCell>,
}

/// Generates and destroys grid cells around a reference position
#[derive(Debug, Clone)]
pub struct GridStreamer {
    config: StreamingConfig,
    enemy: EnemyConfig,
    active: HashMap<CellKey, ActiveCell>,
    occupied: HashSet<SubCell>,
    spawn_points: Vec<(CellKey, Vec3)>,
    spawner_rng: StdRng,
    elapsed: f32,
    spawn_timer: f32,
    stats: StreamingStats,
}

impl GridStreamer {
    /// Create a streamer. Fails if the radii give no hysteresis.
    pub fn new(config: StreamingConfig, enemy: EnemyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            spawner_rng: StdRng::seed_from_u64(config.seed.wrapping_add(1)),
            config,
            enemy,
            active: HashMap::new(),
            occupied: HashSet::new(),
            spawn_points: Vec::new(),
            elapsed: 0.0,
            spawn_timer: 0.0,
            stats: StreamingStats::default(),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn stats(&self) -> &StreamingStats {
        &self.stats
    }

    pub fn is_active(&self, key: CellKey) -> bool {
        self.active.contains_key(&key)
    }

    /// Active cells, sorted
    pub fn active_cells(&self) -> Vec<CellKey> {
        let mut keys: Vec<CellKey> = self.active.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Registered enemy spawn points
    pub fn spawn_points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.spawn_points.iter().map(|(_, p)| *p)
    }

    /// Bring the active set in line with `reference`: generate every missing
    /// cell within the activation radius and destroy every cell beyond the
    /// deactivation radius. Destroyed entities are only flagged; the caller
    /// reaps them.
    pub fn reconcile(&mut self, store: &mut EntityStore, reference: Vec3) -> StreamingUpdate {
        let center = CellKey::containing(reference, self.config.cell_size);
        let radius = self.config.activation_radius;
        let mut update = StreamingUpdate::default();

        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let key = center.offset(dx, dz);
                if !self.active.contains_key(&key) {
                    self.generate(store, key);
                    update.activated.push(key);
                }
            }
        }

        let mut stale: Vec<CellKey> = self
            .active
            .keys()
            .filter(|key| key.distance(&center) > self.config.deactivation_radius)
            .copied()
            .collect();
        stale.sort();
        for key in stale {
            self.destroy(store, key);
            update.deactivated.push(key);
        }

        self.stats.active_cells = self.active.len();
        self.stats.spawn_points = self.spawn_points.len();
        update
    }

    /// Populate a cell: a ground plane plus obstacles on the sub-grid, and
    /// possibly an enemy spawn point. Already active cells are left alone.
    /// Returns how many entities were spawned.
    pub fn generate(&mut self, store: &mut EntityStore, key: CellKey) -> usize {
        if self.active.contains_key(&key) {
            return 0;
        }

        let size = self.config.cell_size;
        let subgrid = self.config.subgrid as i32;
        let slot = size / subgrid as f32;
        let mut rng = StdRng::seed_from_u64(key.seed(self.config.seed));
        let mut cell = ActiveCell::default();
        let mut spawned = 0;

        let center = key.center(size);
        let ground = Mat4::from_translation(center - Vec3::new(0.0, 0.5, 0.0))
            * Mat4::from_scale(Vec3::new(size, 1.0, size));
        store.spawn(static_box(ground, Material::solid(Vec3::new(0.3, 0.5, 0.3))));
        spawned += 1;

        let mut free_slots = Vec::new();
        for j in 0..subgrid {
            for i in 0..subgrid {
                // Draw before any skip so a cell's layout never depends on history
                let roll: f32 = rng.gen();
                let height = rng
                    .gen_range(self.config.obstacle_min_height..=self.config.obstacle_max_height);
                let footprint = rng.gen_range(0.3f32..=0.8) * slot;

                let sub = (key.x * subgrid + i, key.z * subgrid + j);
                let slot_center = key.origin(size)
                    + Vec3::new((i as f32 + 0.5) * slot, 0.0, (j as f32 + 0.5) * slot);
                let clear = Vec3::new(slot_center.x, 0.0, slot_center.z).length()
                    < self.config.origin_clearance;

                if roll >= self.config.obstacle_chance || clear || self.occupied.contains(&sub) {
                    if !self.occupied.contains(&sub) {
                        free_slots.push(slot_center);
                    }
                    continue;
                }

                self.occupied.insert(sub);
                cell.occupied.push(sub);

                let base = slot_center + Vec3::new(0.0, height * 0.5, 0.0);
                let transform = Mat4::from_translation(base)
                    * Mat4::from_scale(Vec3::new(footprint, height, footprint));
                store.spawn(static_box(transform, Material::solid(Vec3::new(0.5, 0.45, 0.4))));
                spawned += 1;
            }
        }

        if !free_slots.is_empty() && rng.gen::<f32>() < self.config.spawn_point_chance {
            let point = free_slots[rng.gen_range(0..free_slots.len())];
            self.spawn_points.push((key, point));
        }

        self.active.insert(key, cell);
        self.stats.cells_generated += 1;
        self.stats.entities_spawned += spawned as u64;
        log::debug!("Generated cell {} ({} entities)", key, spawned);
        spawned
    }

    /// Destroy every non-persistent entity positioned inside the cell and
    /// release its sub-grid slots and spawn points. Returns how many entities
    /// were flagged.
    pub fn destroy(&mut self, store: &mut EntityStore, key: CellKey) -> usize {
        let Some(cell) = self.active.remove(&key) else {
            return 0;
        };
        for sub in &cell.occupied {
            self.occupied.remove(sub);
        }
        self.spawn_points.retain(|(k, _)| *k != key);

        let size = self.config.cell_size;
        let doomed: Vec<EntityHandle> = store
            .iter()
            .filter(|(_, e)| !e.is_persistent() && key.contains(e.position(), size))
            .map(|(h, _)| h)
            .collect();
        for handle in &doomed {
            store.despawn(*handle);
        }

        self.stats.cells_destroyed += 1;
        self.stats.entities_destroyed += doomed.len() as u64;
        log::debug!("Destroyed cell {} ({} entities)", key, doomed.len());
        doomed.len()
    }

    /// Advance the enemy spawner. After the grace period, every interval one
    /// enemy appears at a random spawn point not too close to `player`.
    pub fn update_spawner(
        &mut self,
        store: &mut EntityStore,
        dt: f32,
        player: Vec3,
    ) -> Option<EntityHandle> {
        self.elapsed += dt;
        if self.elapsed < self.config.enemy_spawn_grace {
            return None;
        }

        self.spawn_timer -= dt;
        if self.spawn_timer > 0.0 {
            return None;
        }
        self.spawn_timer = self.config.enemy_spawn_interval;

        if store.count_kind(EntityKind::Enemy) >= self.config.max_enemies {
            return None;
        }

        let min_distance = self.config.min_spawn_distance;
        let candidates: Vec<Vec3> = self
            .spawn_points
            .iter()
            .map(|(_, p)| *p)
            .filter(|p| p.distance(Vec3::new(player.x, 0.0, player.z)) >= min_distance)
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let point = candidates[self.spawner_rng.gen_range(0..candidates.len())];
        let skin = ENEMY_TEXTURES[self.spawner_rng.gen_range(0..ENEMY_TEXTURES.len())];
        // Dropped from slightly above the ground
        let feet = point + Vec3::new(0.0, 0.5, 0.0);
        let enemy = EnemyState::spawn(feet, &self.enemy, Material::textured(skin, 0.5));
        let handle = store.spawn(enemy);
        self.stats.enemies_spawned += 1;
        log::debug!("Enemy {} spawned at {}", handle, feet);
        Some(handle)
    }
}

fn static_box(transform: Mat4, material: Material) -> Entity {
    Entity::fixed(RenderInfo::new(ShapeKind::Cube, material), transform)
        .with_collider(
            Collider::new(AABB::CUBE_UNIT.transform(&transform))
                .with_layer(CollisionLayer::ENVIRONMENT),
        )
}
