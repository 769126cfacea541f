//! Per-tick entity behaviours
//!
//! Every moving kind follows the same shape: propose a displacement, resolve
//! it against the collision index, react to the correction, apply the result.

pub mod enemy;
pub mod player;
pub mod projectile;

use ember_physics::{CollisionInfo, CollisionResolver, MoveQuery, Result as PhysicsResult};
use glam::Vec3;
use rand::rngs::StdRng;

use crate::config::SimConfig;
use crate::entity::{Body, Entity, EntityHandle, EntityKind};
use crate::input::InputState;
use crate::world::EntityStore;

pub use enemy::{EnemyConfig, EnemyState};
pub use player::{PlayerConfig, PlayerState};
pub use projectile::{BurstSpec, HitEffect, ProjectileConfig, ProjectileState};

/// Behaviour payload of an entity
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Immovable geometry
    Static,
    Player(PlayerState),
    Enemy(EnemyState),
    Projectile(ProjectileState),
    /// Stays centred on the player
    Skybox,
}

impl Behavior {
    pub fn kind(&self) -> EntityKind {
        match self {
            Behavior::Static => EntityKind::Static,
            Behavior::Player(_) => EntityKind::Player,
            Behavior::Enemy(_) => EntityKind::Enemy,
            Behavior::Projectile(_) => EntityKind::Projectile,
            Behavior::Skybox => EntityKind::Skybox,
        }
    }

    pub fn as_player(&self) -> Option<&PlayerState> {
        match self {
            Behavior::Player(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyState> {
        match self {
            Behavior::Enemy(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_projectile(&self) -> Option<&ProjectileState> {
        match self {
            Behavior::Projectile(state) => Some(state),
            _ => None,
        }
    }
}

/// Everything an entity may touch while it updates
///
/// The updating entity is checked out of `store`, so it never sees itself
/// there; everything else is readable and new entities can be spawned.
pub struct TickContext<'a> {
    pub store: &'a mut EntityStore,
    pub resolver: &'a CollisionResolver,
    pub input: &'a InputState,
    pub config: &'a SimConfig,
    pub rng: &'a mut StdRng,
    pub player_position: Option<Vec3>,
    pub dt: f32,
}

impl Entity {
    /// Run this entity's behaviour for one update
    pub(crate) fn update(
        &mut self,
        handle: EntityHandle,
        ctx: &mut TickContext<'_>,
    ) -> PhysicsResult<()> {
        let Entity { body, behavior } = self;
        match behavior {
            Behavior::Static => Ok(()),
            Behavior::Player(state) => state.update(body, handle, ctx),
            Behavior::Enemy(state) => state.update(body, handle, ctx),
            Behavior::Projectile(state) => state.update(body, handle, ctx),
            Behavior::Skybox => {
                let Some(target) = ctx.player_position else {
                    return Ok(());
                };
                body.translate(target - body.position())
            }
        }
    }
}

/// Velocity and ground contact shared by the walking kinds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kinematics {
    pub velocity: Vec3,
    pub grounded: bool,
}

impl Kinematics {
    /// Resolve a proposed translation and react to the outcome.
    ///
    /// Returns the translation to apply (proposal plus correction) and the
    /// collision info, if anything was hit. The velocity gains its projection
    /// on the correction direction, scaled by `response`; an upward correction
    /// grounds the mover, and a grounded mover that can freely drop by the
    /// probe epsilon is no longer grounded.
    pub fn resolve(
        &mut self,
        body: &Body,
        handle: EntityHandle,
        ctx: &TickContext<'_>,
        translation: Vec3,
        response: f32,
    ) -> PhysicsResult<(Vec3, Option<CollisionInfo<EntityHandle>>)> {
        let bounds = body.bounds()?;
        let filter = body.collider().map(|c| c.groups);
        let query = MoveQuery::new(handle, bounds, translation).with_filter(filter);

        let store: &EntityStore = &*ctx.store;
        let hit = ctx.resolver.resolve_move(store, store.index(), &query)?;

        let mut translation = translation;
        if let Some(info) = &hit {
            let direction = info.correction.normalize_or_zero();
            let along = self.velocity.normalize_or_zero().dot(direction);
            self.velocity += self.velocity * along * response;
            if direction.y > 0.0 {
                self.grounded = true;
            }
            translation += info.correction;
        }

        if self.grounded {
            let index = store.index();
            if !ctx.resolver.probe_ground(store, index, handle, bounds, filter)? {
                self.grounded = false;
            }
        }

        Ok((translation, hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Material, RenderInfo, ShapeKind};
    use glam::Mat4;
    use rand::SeedableRng;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Behavior::Static.kind(), EntityKind::Static);
        assert_eq!(Behavior::Skybox.kind(), EntityKind::Skybox);
        let player = Behavior::Player(PlayerState::default());
        assert!(player.as_player().is_some());
        assert!(player.as_enemy().is_none());
    }

    #[test]
    fn test_skybox_follows_player() {
        let mut store = EntityStore::new();
        let config = SimConfig::default();
        let resolver = CollisionResolver::new(config.physics.clone());
        let input = InputState::new();
        let mut rng = StdRng::seed_from_u64(1);

        let mut sky = Entity::new(
            Behavior::Skybox,
            RenderInfo::new(ShapeKind::SkyCube, Material::default()),
            Mat4::from_scale(Vec3::splat(50.0)),
        );
        let handle = EntityHandle::null();
        let mut ctx = TickContext {
            store: &mut store,
            resolver: &resolver,
            input: &input,
            config: &config,
            rng: &mut rng,
            player_position: Some(Vec3::new(4.0, 1.0, -2.0)),
            dt: 1.0 / 60.0,
        };
        sky.update(handle, &mut ctx).unwrap();
        assert_eq!(sky.position(), Vec3::new(4.0, 1.0, -2.0));
    }
}
