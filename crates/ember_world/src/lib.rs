//! Ember World - Entities, Tick Loop and Streaming
//!
//! Owns every simulated entity, runs the per-tick update and reap phases, and
//! streams procedurally generated grid cells in and out around the player.
//!
//! # Features
//!
//! - Generational entity handles that never keep an entity alive
//! - Deferred removal: entities are flagged and reaped between update passes
//! - Player, enemy and projectile movement over bounded-pass collision
//! - Grid streaming with hysteresis and deterministic cell generation
//! - TOML configuration
//!
//! # Tick
//!
//! ```text
//!  tick(dt)
//!   ├─ update pass ── each live entity (checked out of the arena)
//!   │                  may resolve moves, spawn, flag itself
//!   ├─ reap ───────── drop flagged entities and stale collision handles
//!   ├─ (second update pass + reap when two_pass_tick is set)
//!   └─ GridStreamer::reconcile(player position) + enemy spawner, reap
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ember_world::prelude::*;
//!
//! let mut world = World::new(SimConfig::default())?;
//! world.spawn_player(Vec3::ZERO);
//! world.input_mut().key_down(Action::MoveForward);
//! for _ in 0..60 {
//!     world.tick(1.0 / 60.0);
//! }
//! let frame = world.render_snapshot();
//! ```

pub mod behavior;
pub mod config;
pub mod entity;
pub mod error;
pub mod health;
pub mod input;
pub mod render;
pub mod scene;
pub mod streaming;
pub mod world;

pub mod prelude {
    pub use crate::behavior::{
        Behavior, BurstSpec, EnemyConfig, EnemyState, HitEffect, Kinematics, PlayerConfig,
        PlayerState, ProjectileConfig, ProjectileState, TickContext,
    };
    pub use crate::config::SimConfig;
    pub use crate::entity::{Body, Collider, Entity, EntityHandle, EntityKind};
    pub use crate::error::{Result, WorldError};
    pub use crate::health::Health;
    pub use crate::input::{Action, InputState};
    pub use crate::render::{Material, RenderInfo, RenderItem, ShapeKind};
    pub use crate::scene::{
        AabbProvider, IdealBounds, MeshBounds, SceneGlobals, SceneShape, SceneSource, StaticScene,
    };
    pub use crate::streaming::{
        CellKey, GridStreamer, StreamingConfig, StreamingStats, StreamingUpdate,
    };
    pub use crate::world::{EntityStore, World};
    pub use glam::{Mat4, Vec3};
}

pub use prelude::*;
