//! Entities
//!
//! An [`Entity`] is a [`Body`] (transform, optional collider, render state,
//! removal flag) plus a [`Behavior`] that drives it each tick. Entities are
//! owned by the world's arena and referred to everywhere else by
//! [`EntityHandle`], a generation-checked key that never keeps them alive.

use ember_physics::{
    ColliderState, CollisionGroups, CollisionLayer, PhysicsError, Result as PhysicsResult, AABB,
};
use ember_structures::SlotKey;
use glam::{Mat3, Mat4, Vec3};

use crate::behavior::Behavior;
use crate::render::{normal_matrix, RenderInfo, RenderItem};

/// Non-owning, generation-checked entity reference
pub type EntityHandle = SlotKey<Entity>;

/// Closed set of entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Static,
    Player,
    Enemy,
    Projectile,
    Skybox,
}

/// Collision participation of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    bounds: Option<AABB>,
    pub groups: CollisionGroups,
}

impl Collider {
    /// Collider with computed bounds
    pub fn new(bounds: AABB) -> Self {
        Self {
            bounds: Some(bounds),
            groups: CollisionGroups::ALL,
        }
    }

    /// Collider whose bounds have not been computed yet
    pub fn pending() -> Self {
        Self {
            bounds: None,
            groups: CollisionGroups::ALL,
        }
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_layer(self, layer: CollisionLayer) -> Self {
        self.with_groups(CollisionGroups::member_of(layer))
    }

    pub fn bounds(&self) -> Option<AABB> {
        self.bounds
    }

}

/// Spatial and render state shared by every entity kind
#[derive(Debug, Clone)]
pub struct Body {
    transform: Mat4,
    normal_matrix: Mat3,
    collider: Option<Collider>,
    render: RenderInfo,
    movable: bool,
    pending_removal: bool,
}

impl Body {
    fn new(transform: Mat4, render: RenderInfo, movable: bool) -> Self {
        Self {
            transform,
            normal_matrix: normal_matrix(&transform),
            collider: None,
            render,
            movable,
            pending_removal: false,
        }
    }

    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    /// Inverse-transpose of the transform's linear part
    pub fn normal_matrix(&self) -> &Mat3 {
        &self.normal_matrix
    }

    /// Translation column of the transform
    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    /// Current collision bounds. Fails if there is no collider or its
    /// bounds were never computed.
    pub fn bounds(&self) -> PhysicsResult<AABB> {
        let collider = self
            .collider
            .as_ref()
            .ok_or_else(|| PhysicsError::NoCollider(format!("entity at {}", self.position())))?;
        collider.bounds.ok_or_else(|| {
            PhysicsError::ShapeNotComputed(format!("entity at {}", self.position()))
        })
    }

    /// Fill in the bounds of a pending collider
    pub fn set_bounds(&mut self, bounds: AABB) -> PhysicsResult<()> {
        let position = self.position();
        let collider = self
            .collider
            .as_mut()
            .ok_or_else(|| PhysicsError::NoCollider(format!("entity at {}", position)))?;
        collider.bounds = Some(bounds);
        Ok(())
    }

    pub(crate) fn collider_state(&self) -> ColliderState {
        match &self.collider {
            None => ColliderState::Absent,
            Some(Collider { bounds: None, .. }) => ColliderState::Pending,
            Some(Collider {
                bounds: Some(bounds),
                groups,
            }) => ColliderState::Ready {
                bounds: *bounds,
                groups: *groups,
            },
        }
    }

    /// Move by a world-space delta. The transform, normal matrix and collision
    /// bounds move together; extents never change.
    pub fn translate(&mut self, delta: Vec3) -> PhysicsResult<()> {
        if !self.movable {
            return Err(PhysicsError::StaticBodyMoved(format!(
                "entity at {}",
                self.position()
            )));
        }
        self.transform = Mat4::from_translation(delta) * self.transform;
        self.normal_matrix = normal_matrix(&self.transform);
        if let Some(bounds) = self.collider.as_mut().and_then(|c| c.bounds.as_mut()) {
            bounds.translate(delta);
        }
        Ok(())
    }

    pub fn render(&self) -> &RenderInfo {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderInfo {
        &mut self.render
    }

    /// Flag for removal at the next reap
    pub fn queue_free(&mut self) {
        self.pending_removal = true;
    }

    pub fn is_pending_removal(&self) -> bool {
        self.pending_removal
    }
}

/// A simulated object
#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) body: Body,
    pub(crate) behavior: Behavior,
}

impl Entity {
    /// Create an entity without a collider
    pub fn new(behavior: Behavior, render: RenderInfo, transform: Mat4) -> Self {
        let movable = !matches!(behavior, Behavior::Static);
        Self {
            body: Body::new(transform, render, movable),
            behavior,
        }
    }

    /// Immovable scene geometry
    pub fn fixed(render: RenderInfo, transform: Mat4) -> Self {
        Self::new(Behavior::Static, render, transform)
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.body.collider = Some(collider);
        self
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    pub fn kind(&self) -> EntityKind {
        self.behavior.kind()
    }

    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    pub fn transform(&self) -> &Mat4 {
        self.body.transform()
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.body.collider()
    }

    pub fn bounds(&self) -> PhysicsResult<AABB> {
        self.body.bounds()
    }

    pub fn translate(&mut self, delta: Vec3) -> PhysicsResult<()> {
        self.body.translate(delta)
    }

    pub fn queue_free(&mut self) {
        self.body.queue_free();
    }

    pub fn is_pending_removal(&self) -> bool {
        self.body.is_pending_removal()
    }

    /// Whether touching this entity hurts damageable entities
    pub fn is_damaging(&self) -> bool {
        matches!(self.behavior, Behavior::Projectile(_)) && self.body.collider.is_some()
    }

    /// Entities that survive cell deactivation
    pub fn is_persistent(&self) -> bool {
        matches!(self.kind(), EntityKind::Player | EntityKind::Skybox)
    }

    pub fn should_render(&self) -> bool {
        self.kind() != EntityKind::Player && self.body.render.visible
    }

    /// Snapshot entry, if rendered
    pub fn render_item(&self) -> Option<RenderItem> {
        if !self.should_render() {
            return None;
        }
        Some(RenderItem {
            transform: self.body.transform,
            normal_matrix: self.body.normal_matrix,
            material: self.body.render.material.clone(),
            shape: self.body.render.shape,
        })
    }
}
