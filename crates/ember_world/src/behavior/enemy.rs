//! Enemy movement and damage
//!
//! Enemies walk straight at the player's ground position under gravity.
//! Touching a damaging entity costs a hit; a non-lethal hit flashes the
//! enemy's material for a short time.

use ember_physics::{CollisionLayer, Result as PhysicsResult, AABB};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::{Behavior, Kinematics, TickContext};
use crate::entity::{Body, Collider, Entity, EntityHandle};
use crate::health::Health;
use crate::render::{Material, RenderInfo, ShapeKind};

/// Enemy tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Horizontal walking speed
    pub speed: f32,
    pub gravity: f32,
    pub hit_points: f32,
    pub damage_per_hit: f32,
    /// How long the damaged material shows after a hit
    pub flash_duration: f32,
    /// Scale of the velocity reaction to a collision correction
    pub collision_response: f32,
    /// Edge length of the enemy cube
    pub size: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            gravity: 15.0,
            hit_points: 3.0,
            damage_per_hit: 1.0,
            flash_duration: 0.2,
            collision_response: 1.0,
            size: 1.0,
        }
    }
}

/// Enemy state
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyState {
    pub kinematics: Kinematics,
    pub health: Health,
    flash_remaining: f32,
    skin: Material,
}

impl EnemyState {
    pub fn new(config: &EnemyConfig, skin: Material) -> Self {
        Self {
            kinematics: Kinematics::default(),
            health: Health::new(config.hit_points),
            flash_remaining: 0.0,
            skin,
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_remaining > 0.0
    }

    /// Build an enemy cube resting its base on `feet`
    pub fn spawn(feet: Vec3, config: &EnemyConfig, skin: Material) -> Entity {
        let center = feet + Vec3::new(0.0, config.size * 0.5, 0.0);
        let transform = Mat4::from_translation(center) * Mat4::from_scale(Vec3::splat(config.size));
        let state = EnemyState::new(config, skin.clone());
        Entity::new(
            Behavior::Enemy(state),
            RenderInfo::new(ShapeKind::Cube, skin),
            transform,
        )
        .with_collider(
            Collider::new(AABB::CUBE_UNIT.transform(&transform))
                .with_layer(CollisionLayer::ENEMIES),
        )
    }

    /// Take one hit. Returns true if it was lethal; the body is then queued
    /// for removal, otherwise it starts flashing.
    pub fn take_hit(&mut self, body: &mut Body, config: &EnemyConfig) -> bool {
        if self.health.apply_damage(config.damage_per_hit) {
            body.queue_free();
            return true;
        }
        if self.health.is_dead {
            return false;
        }
        self.flash_remaining = config.flash_duration;
        body.render_mut().material = self.skin.damaged();
        false
    }

    fn update_flash(&mut self, body: &mut Body, dt: f32) {
        if self.flash_remaining <= 0.0 {
            return;
        }
        self.flash_remaining -= dt;
        if self.flash_remaining <= 0.0 {
            self.flash_remaining = 0.0;
            body.render_mut().material = self.skin.clone();
        }
    }

    pub(crate) fn update(
        &mut self,
        body: &mut Body,
        handle: EntityHandle,
        ctx: &mut TickContext<'_>,
    ) -> PhysicsResult<()> {
        let config = &ctx.config.enemy;
        let dt = ctx.dt;

        self.update_flash(body, dt);

        if let Some(target) = ctx.player_position {
            let here = body.position();
            let to_player = Vec3::new(target.x - here.x, 0.0, target.z - here.z);
            let walk = to_player.normalize_or_zero() * config.speed;
            self.kinematics.velocity.x = walk.x;
            self.kinematics.velocity.z = walk.z;
        }

        if !self.kinematics.grounded {
            self.kinematics.velocity.y -= config.gravity * dt;
        }

        let proposed = self.kinematics.velocity * dt;
        let (translation, hit) =
            self.kinematics
                .resolve(body, handle, ctx, proposed, config.collision_response)?;

        let shot = hit.map_or(false, |info| {
            info.touched
                .iter()
                .any(|h| ctx.store.get(*h).map_or(false, |e| e.is_damaging()))
        });
        if shot {
            log::debug!("Enemy {} shot", handle);
            if self.take_hit(body, config) {
                return Ok(());
            }
        }

        body.translate(translation)
    }
}
