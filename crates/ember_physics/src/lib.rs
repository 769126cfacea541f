//! Ember Physics - Axis-Aligned Collision
//!
//! Collision detection and resolution for the Ember simulation core.
//! There is no rigid-body dynamics here: movers propose a displacement and the
//! resolver pushes it back out of whatever it would overlap.
//!
//! # Features
//!
//! - Axis-aligned bounding boxes with minimal-translation separation
//! - Collision groups for per-mover filtering
//! - A collision index of non-owning handles
//! - Bounded, multi-pass move resolution
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              CollisionResolver               │
//! │   MoveQuery ──► passes ≤ max_passes ──►      │
//! │                 CollisionInfo { correction,  │
//! │                                 touched }    │
//! └───────────────┬──────────────────────────────┘
//!                 │ iterates
//!         ┌───────▼────────┐      ┌────────────────┐
//!         │ CollisionIndex │ ───► │ ColliderSource │
//!         │  (handles K)   │      │ K → ColliderState
//!         └────────────────┘      └────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ember_physics::prelude::*;
//!
//! let resolver = CollisionResolver::new(PhysicsConfig::default());
//! let query = MoveQuery::new(me, my_box, Vec3::new(0.0, -0.1, 0.0));
//! if let Some(info) = resolver.resolve_move(&world, &index, &query)? {
//!     // info.correction pushes the mover out of everything in info.touched
//! }
//! ```

pub mod aabb;
pub mod config;
pub mod error;
pub mod groups;
pub mod index;
pub mod resolver;

pub mod prelude {
    //! Common imports for collision functionality
    pub use crate::aabb::AABB;
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::groups::{CollisionGroups, CollisionLayer};
    pub use crate::index::CollisionIndex;
    pub use crate::resolver::{
        ColliderSource, ColliderState, CollisionInfo, CollisionResolver, MoveQuery,
    };
    pub use glam::Vec3;
}

pub use prelude::*;
