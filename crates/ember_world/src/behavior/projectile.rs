//! Projectiles: straight-line movers with a range limit and an optional burst

use ember_physics::{CollisionGroups, CollisionLayer, MoveQuery, Result as PhysicsResult, AABB};
use glam::{Mat4, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Behavior, TickContext};
use crate::entity::{Body, Collider, Entity, EntityHandle};
use crate::render::{Material, RenderInfo, ShapeKind};

/// Relative slack on the range check
const RANGE_TOLERANCE: f32 = 1e-5;

/// Secondary projectiles released when a bursting projectile hits something
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstSpec {
    pub count: u32,
    pub speed: f32,
    pub max_distance: f32,
    /// Uniform scale of each fragment relative to the parent
    pub scale: f32,
    /// Whether fragments collide (and so damage enemies)
    pub colliding: bool,
}

impl Default for BurstSpec {
    fn default() -> Self {
        Self {
            count: 100,
            speed: 10.0,
            max_distance: 10.0,
            scale: 0.1,
            colliding: true,
        }
    }
}

/// Projectile tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub bullet_speed: f32,
    pub bullet_range: f32,
    pub bullet_scale: f32,
    pub burst: BurstSpec,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            bullet_speed: 20.0,
            bullet_range: 50.0,
            bullet_scale: 0.2,
            burst: BurstSpec::default(),
        }
    }
}

/// What a projectile does when its move collides
#[derive(Debug, Clone, PartialEq)]
pub enum HitEffect {
    /// Remove itself
    Expire,
    /// Spawn a burst, then remove itself
    Burst(BurstSpec),
    /// Keep flying
    PassThrough,
}

/// Projectile state
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileState {
    direction: Vec3,
    speed: f32,
    max_distance: f32,
    traveled: f32,
    on_hit: HitEffect,
}

impl ProjectileState {
    /// New projectile. `direction` is normalised.
    pub fn new(direction: Vec3, speed: f32, max_distance: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            speed,
            max_distance,
            traveled: 0.0,
            on_hit: HitEffect::Expire,
        }
    }

    pub fn with_hit_effect(mut self, on_hit: HitEffect) -> Self {
        self.on_hit = on_hit;
        self
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn traveled(&self) -> f32 {
        self.traveled
    }

    pub fn on_hit(&self) -> &HitEffect {
        &self.on_hit
    }

    /// Groups of colliding projectiles: they hit enemies and scenery only
    pub fn groups() -> CollisionGroups {
        CollisionGroups::from_layer(
            CollisionLayer::PROJECTILES,
            &[
                CollisionLayer::DEFAULT,
                CollisionLayer::ENEMIES,
                CollisionLayer::ENVIRONMENT,
            ],
        )
    }

    /// Build a sphere projectile entity
    pub fn spawn(self, transform: Mat4, colliding: bool) -> Entity {
        let entity = Entity::new(
            Behavior::Projectile(self),
            RenderInfo::new(ShapeKind::Sphere, Material::fragment()),
            transform,
        );
        if colliding {
            let bounds = AABB::CUBE_UNIT.transform(&transform);
            entity.with_collider(Collider::new(bounds).with_groups(Self::groups()))
        } else {
            entity
        }
    }

    /// A bursting bullet fired from `shooter` along `look`
    pub fn bullet(shooter: &Body, look: Vec3, config: &ProjectileConfig) -> Entity {
        let look = look.normalize_or_zero();
        let reach = shooter
            .bounds()
            .map(|b| b.half_extents().max_element())
            .unwrap_or(0.5);
        let origin = shooter.position() + look * (reach + config.bullet_scale);
        let transform =
            Mat4::from_translation(origin) * Mat4::from_scale(Vec3::splat(config.bullet_scale));
        Self::new(look, config.bullet_speed, config.bullet_range)
            .with_hit_effect(HitEffect::Burst(config.burst.clone()))
            .spawn(transform, true)
    }

    pub(crate) fn update(
        &mut self,
        body: &mut Body,
        handle: EntityHandle,
        ctx: &mut TickContext<'_>,
    ) -> PhysicsResult<()> {
        let translation = self.direction * self.speed * ctx.dt;

        if let Some(collider) = body.collider() {
            let query = MoveQuery::new(handle, body.bounds()?, translation)
                .with_filter(Some(collider.groups))
                .with_max_passes(1);
            let hit = ctx.resolver.resolve_move(&*ctx.store, ctx.store.index(), &query)?;
            if hit.is_some() {
                match &self.on_hit {
                    HitEffect::Expire => {
                        body.queue_free();
                        return Ok(());
                    }
                    HitEffect::Burst(spec) => {
                        spawn_burst(body, spec, ctx);
                        body.queue_free();
                        return Ok(());
                    }
                    HitEffect::PassThrough => {}
                }
            }
        }

        body.translate(translation)?;
        self.traveled += translation.length();

        if self.has_reached_range() {
            body.queue_free();
        }
        Ok(())
    }

    /// Whether the accumulated distance covers the range. Accumulated f32
    /// steps fall short of the exact sum, so a relative slack is allowed.
    pub fn has_reached_range(&self) -> bool {
        self.traveled >= self.max_distance * (1.0 - RANGE_TOLERANCE)
    }
}

/// Release fragments from `origin` in random directions
fn spawn_burst(origin: &Body, spec: &BurstSpec, ctx: &mut TickContext<'_>) {
    log::debug!("Burst of {} at {}", spec.count, origin.position());
    for _ in 0..spec.count {
        let direction = random_direction(&mut *ctx.rng);
        let transform = *origin.transform()
            * Mat4::from_scale(Vec3::splat(spec.scale))
            * Mat4::from_translation(direction);
        let fragment = ProjectileState::new(direction, spec.speed, spec.max_distance)
            .with_hit_effect(HitEffect::PassThrough)
            .spawn(transform, spec.colliding);
        ctx.store.spawn(fragment);
    }
}

/// Uniform in the cube, normalised; degenerate draws fall back to up
fn random_direction(rng: &mut impl Rng) -> Vec3 {
    let v = Vec3::new(
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
    );
    let direction = v.normalize_or_zero();
    if direction == Vec3::ZERO {
        Vec3::Y
    } else {
        direction
    }
}
