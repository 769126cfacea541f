//! World - entity ownership and tick orchestration
//!
//! The world owns every entity in a generational arena. A tick runs one or two
//! update passes, each followed by a reap, then lets the grid streamer
//! reconcile the active cells around the player.
//!
//! During an update pass the current entity is checked out of the arena, so
//! its behaviour can mutate it while reading every other entity. New entities
//! spawned mid-pass are appended to the live list and updated in the same pass.

use ember_physics::{ColliderSource, ColliderState, CollisionIndex, CollisionResolver};
use ember_structures::SlotMap;
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::behavior::{Behavior, EnemyState, PlayerState, TickContext};
use crate::config::SimConfig;
use crate::entity::{Collider, Entity, EntityHandle, EntityKind};
use crate::error::{Result, WorldError};
use crate::input::InputState;
use crate::render::{Material, RenderInfo, RenderItem, ShapeKind, ENEMY_TEXTURES};
use crate::scene::{AabbProvider, SceneGlobals, SceneSource};
use crate::streaming::{GridStreamer, StreamingStats};

/// Arena, update order and collision index
///
/// Everything here is owned by the [`World`]; behaviours see it through
/// [`TickContext`].
#[derive(Default)]
pub struct EntityStore {
    arena: SlotMap<Entity>,
    live: Vec<EntityHandle>,
    index: CollisionIndex<EntityHandle>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an entity. Entities with a collider join the
    /// collision index.
    pub fn spawn(&mut self, entity: Entity) -> EntityHandle {
        let collidable = entity.collider().is_some();
        let kind = entity.kind();
        let handle = self.arena.insert(entity);
        self.live.push(handle);
        if collidable {
            self.index.register(handle);
        }
        log::trace!("Spawned {:?} {}", kind, handle);
        handle
    }

    /// Flag an entity for removal at the next reap
    pub fn despawn(&mut self, handle: EntityHandle) -> bool {
        match self.arena.get_mut(handle) {
            Some(entity) => {
                entity.queue_free();
                true
            }
            None => false,
        }
    }

    /// Remove every flagged entity from the live list and arena, then drop
    /// expired handles from the collision index. Returns how many were reaped.
    pub fn reap(&mut self) -> usize {
        let arena = &mut self.arena;
        let mut reaped = 0;
        self.live.retain(|handle| match arena.get(*handle) {
            Some(entity) if entity.is_pending_removal() => {
                arena.remove(*handle);
                reaped += 1;
                false
            }
            Some(_) => true,
            None => false,
        });

        let arena = &self.arena;
        let pruned = self.index.prune(|handle| arena.contains_key(handle));
        if reaped > 0 {
            log::debug!("Reaped {} entities ({} collision handles pruned)", reaped, pruned);
        }
        reaped
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.arena.get(handle)
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.arena.get_mut(handle)
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.arena.contains_key(handle)
    }

    /// Handles in update order
    pub fn live(&self) -> &[EntityHandle] {
        &self.live
    }

    pub fn index(&self) -> &CollisionIndex<EntityHandle> {
        &self.index
    }

    /// Live entities with their handles, in update order
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> + '_ {
        self.live
            .iter()
            .filter_map(move |h| self.arena.get(*h).map(|e| (*h, e)))
    }

    /// Number of live entities of one kind
    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.iter().filter(|(_, e)| e.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn checkout(&mut self, handle: EntityHandle) -> Option<Entity> {
        self.arena.checkout(handle)
    }

    fn restore(&mut self, handle: EntityHandle, entity: Entity) {
        if self.arena.restore(handle, entity).is_err() {
            log::error!("Entity {} could not be returned to its slot", handle);
        }
    }
}

impl ColliderSource<EntityHandle> for EntityStore {
    fn collider(&self, handle: EntityHandle) -> ColliderState {
        // The entity being updated is out of its slot but still alive
        if self.arena.is_checked_out(handle) {
            return ColliderState::Absent;
        }
        match self.arena.get(handle) {
            Some(entity) => entity.body().collider_state(),
            None => ColliderState::Stale,
        }
    }
}

/// The simulation
pub struct World {
    store: EntityStore,
    streamer: Option<GridStreamer>,
    resolver: CollisionResolver,
    config: SimConfig,
    input: InputState,
    globals: SceneGlobals,
    rng: StdRng,
    player: Option<EntityHandle>,
    elapsed: f32,
    ticks: u64,
}

impl World {
    /// Create a world. The configuration is validated first.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;

        let streamer = if config.streaming.enabled {
            Some(GridStreamer::new(config.streaming.clone(), config.enemy.clone())?)
        } else {
            None
        };

        log::info!(
            "World created (seed {}, streaming {}, {} pass tick)",
            config.seed,
            if streamer.is_some() { "on" } else { "off" },
            if config.two_pass_tick { "two" } else { "one" }
        );

        Ok(Self {
            store: EntityStore::new(),
            streamer,
            resolver: CollisionResolver::new(config.physics.clone()),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            input: InputState::new(),
            globals: SceneGlobals::default(),
            player: None,
            elapsed: 0.0,
            ticks: 0,
        })
    }

    /// Add an entity
    pub fn spawn(&mut self, entity: Entity) -> EntityHandle {
        self.store.spawn(entity)
    }

    /// Flag an entity for removal; it disappears at the next reap
    pub fn despawn(&mut self, handle: EntityHandle) -> bool {
        self.store.despawn(handle)
    }

    /// Spawn the player with its feet at `feet` and follow it
    pub fn spawn_player(&mut self, feet: Vec3) -> EntityHandle {
        let handle = self.store.spawn(PlayerState::spawn(feet, &self.config.player));
        self.player = Some(handle);
        log::info!("Player spawned at {}", feet);
        handle
    }

    /// Spawn an enemy with a random skin
    pub fn spawn_enemy(&mut self, feet: Vec3) -> EntityHandle {
        let skin = ENEMY_TEXTURES[self.rng.gen_range(0..ENEMY_TEXTURES.len())];
        let entity = EnemyState::spawn(feet, &self.config.enemy, Material::textured(skin, 0.5));
        self.store.spawn(entity)
    }

    /// Spawn a skybox that tracks the player
    pub fn spawn_skybox(&mut self, size: f32) -> EntityHandle {
        let center = self.player_position().unwrap_or(Vec3::ZERO);
        let transform = Mat4::from_translation(center) * Mat4::from_scale(Vec3::splat(size));
        self.store.spawn(Entity::new(
            Behavior::Skybox,
            RenderInfo::new(ShapeKind::SkyCube, Material::default()),
            transform,
        ))
    }

    /// Spawn the static geometry of a scene. Shapes the provider gives no
    /// bounds for are spawned without a collider. The scene's lighting and
    /// camera values are kept for the renderer and the camera look becomes
    /// the input look. Returns how many shapes were spawned.
    pub fn load_scene(&mut self, source: &dyn SceneSource, provider: &dyn AabbProvider) -> usize {
        self.globals = source.globals();
        self.input.set_look(self.globals.camera_look);

        let shapes = source.shapes();
        for shape in &shapes {
            let mut entity = Entity::fixed(
                RenderInfo::new(shape.shape, shape.material.clone()),
                shape.transform,
            );
            if let Some(bounds) = provider.bounds(shape.shape, &shape.transform) {
                entity = entity.with_collider(Collider::new(bounds));
            }
            self.store.spawn(entity);
        }
        log::info!("Loaded {} scene shapes", shapes.len());
        shapes.len()
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let passes = if self.config.two_pass_tick { 2 } else { 1 };
        for _ in 0..passes {
            self.update_pass(dt);
            self.store.reap();
        }

        let reference = self.player_position();
        if let (Some(streamer), Some(reference)) = (self.streamer.as_mut(), reference) {
            let update = streamer.reconcile(&mut self.store, reference);
            streamer.update_spawner(&mut self.store, dt, reference);
            self.store.reap();
            if update.has_updates() {
                log::debug!(
                    "Streaming: +{} -{} cells around {}",
                    update.activated.len(),
                    update.deactivated.len(),
                    reference
                );
            }
        }

        self.elapsed += dt;
        self.ticks += 1;
    }

    fn update_pass(&mut self, dt: f32) {
        // Length is re-read every iteration: updates may spawn
        let mut i = 0;
        while i < self.store.live.len() {
            let handle = self.store.live[i];
            i += 1;

            // Current, not start-of-pass, player position
            let player_position = self.player_position();
            let Some(mut entity) = self.store.checkout(handle) else {
                continue;
            };
            if entity.is_pending_removal() {
                self.store.restore(handle, entity);
                continue;
            }

            let mut ctx = TickContext {
                store: &mut self.store,
                resolver: &self.resolver,
                input: &self.input,
                config: &self.config,
                rng: &mut self.rng,
                player_position,
                dt,
            };
            if let Err(err) = entity.update(handle, &mut ctx) {
                log::error!("Update of {:?} {} aborted: {}", entity.kind(), handle, err);
            }

            self.store.restore(handle, entity);
        }
    }

    /// Remove flagged entities now
    pub fn reap(&mut self) -> usize {
        self.store.reap()
    }

    /// Apply one hit to a damageable entity. Returns true if it was lethal.
    pub fn hit(&mut self, handle: EntityHandle) -> Result<bool> {
        let entity = self
            .store
            .get_mut(handle)
            .ok_or_else(|| WorldError::EntityNotFound(handle.to_string()))?;
        let Entity { body, behavior } = entity;
        match behavior {
            Behavior::Enemy(state) => Ok(state.take_hit(body, &self.config.enemy)),
            _ => Ok(false),
        }
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.store.get(handle)
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.store.get_mut(handle)
    }

    /// Handles in update order
    pub fn live_handles(&self) -> &[EntityHandle] {
        self.store.live()
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn collision_index(&self) -> &CollisionIndex<EntityHandle> {
        self.store.index()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The followed player, if still alive
    pub fn player(&self) -> Option<EntityHandle> {
        self.player.filter(|h| self.store.contains(*h))
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.player
            .and_then(|h| self.store.get(h))
            .map(|e| e.position())
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn streamer(&self) -> Option<&GridStreamer> {
        self.streamer.as_ref()
    }

    pub fn streaming_stats(&self) -> Option<&StreamingStats> {
        self.streamer.as_ref().map(|s| s.stats())
    }

    /// Simulated seconds so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Lighting and camera values of the loaded scene
    pub fn scene_globals(&self) -> &SceneGlobals {
        &self.globals
    }

    /// Read-only view of everything that should be drawn this tick
    pub fn render_snapshot(&self) -> Vec<RenderItem> {
        self.store.iter().filter_map(|(_, e)| e.render_item()).collect()
    }
}
