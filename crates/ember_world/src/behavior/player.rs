//! Player movement: input-driven acceleration, friction, gravity and jumping

use ember_physics::{CollisionGroups, CollisionLayer, Result as PhysicsResult, AABB};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::projectile::ProjectileState;
use super::{Behavior, Kinematics, TickContext};
use crate::entity::{Body, Collider, Entity, EntityHandle};
use crate::input::Action;
use crate::render::{Material, RenderInfo, ShapeKind};

/// Player tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal acceleration from input
    pub move_accel: f32,
    /// Horizontal deceleration, always applied
    pub friction: f32,
    /// Horizontal speed cap
    pub max_horizontal_speed: f32,
    pub gravity: f32,
    /// Fall speed cap
    pub terminal_velocity: f32,
    /// Applied as an acceleration while grounded and jump is held
    pub jump_speed: f32,
    /// Scale of the velocity reaction to a collision correction
    pub collision_response: f32,
    /// Half extents of the player's box
    pub half_extents: Vec3,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_accel: 20.0,
            friction: 30.0,
            max_horizontal_speed: 5.0,
            gravity: 10.0,
            terminal_velocity: 100.0,
            jump_speed: 150.0,
            collision_response: 1.0,
            half_extents: Vec3::new(0.25, 0.5, 0.25),
        }
    }
}

impl PlayerConfig {
    /// Input acceleration including the friction it has to overcome
    pub fn accel_with_friction(&self) -> f32 {
        self.move_accel + self.friction
    }

    /// Collision groups of the player: everything except projectiles
    pub fn groups() -> CollisionGroups {
        CollisionGroups::from_layer(
            CollisionLayer::PLAYER,
            &[
                CollisionLayer::DEFAULT,
                CollisionLayer::ENEMIES,
                CollisionLayer::ENVIRONMENT,
            ],
        )
    }
}

/// Player state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    pub kinematics: Kinematics,
    fire_held: bool,
}

impl PlayerState {
    pub fn velocity(&self) -> Vec3 {
        self.kinematics.velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.kinematics.grounded
    }

    /// Build a player entity standing with its feet centred on `feet`
    pub fn spawn(feet: Vec3, config: &PlayerConfig) -> Entity {
        let center = feet + Vec3::new(0.0, config.half_extents.y, 0.0);
        let bounds = AABB::from_center_half_extents(center, config.half_extents);
        Entity::new(
            Behavior::Player(PlayerState::default()),
            RenderInfo::new(ShapeKind::Cube, Material::default()).hidden(),
            Mat4::from_translation(center),
        )
        .with_collider(Collider::new(bounds).with_groups(PlayerConfig::groups()))
    }

    pub(crate) fn update(
        &mut self,
        body: &mut Body,
        handle: EntityHandle,
        ctx: &mut TickContext<'_>,
    ) -> PhysicsResult<()> {
        let config = &ctx.config.player;
        let dt = ctx.dt;
        let input = ctx.input;

        let mut accel = Vec3::ZERO;
        let forward = input.look_flat();
        let left = input.left_flat();
        let push = config.accel_with_friction() * dt;
        if input.is_held(Action::MoveForward) {
            accel += push * forward;
        }
        if input.is_held(Action::MoveBack) {
            accel -= push * forward;
        }
        if input.is_held(Action::MoveLeft) {
            accel += push * left;
        }
        if input.is_held(Action::MoveRight) {
            accel -= push * left;
        }
        if self.kinematics.grounded && input.is_held(Action::Jump) {
            accel.y += config.jump_speed * dt;
        }

        let velocity = &mut self.kinematics.velocity;
        *velocity += accel;

        let mut horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
        let speed = horizontal.length();
        if speed > 0.0 {
            if speed < config.friction * dt {
                horizontal = Vec3::ZERO;
            } else {
                horizontal -= config.friction * horizontal.normalize() * dt;
            }
        }
        if speed > config.max_horizontal_speed {
            horizontal = horizontal.normalize_or_zero() * config.max_horizontal_speed;
        }
        *velocity = Vec3::new(horizontal.x, velocity.y, horizontal.z);

        if !self.kinematics.grounded {
            self.kinematics.velocity.y -= config.gravity * dt;
        }
        if self.kinematics.velocity.y < -config.terminal_velocity {
            self.kinematics.velocity.y = -config.terminal_velocity;
        }

        let proposed = self.kinematics.velocity * dt;
        let response = config.collision_response;
        let (translation, _) = self.kinematics.resolve(body, handle, ctx, proposed, response)?;
        body.translate(translation)?;

        let firing = ctx.input.is_held(Action::Fire);
        if firing && !self.fire_held {
            let bullet = ProjectileState::bullet(body, ctx.input.look(), &ctx.config.projectile);
            let bullet = ctx.store.spawn(bullet);
            log::debug!("Player fired {}", bullet);
        }
        self.fire_held = firing;

        Ok(())
    }
}
