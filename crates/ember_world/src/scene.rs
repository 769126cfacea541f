//! Scene input and bounds providers
//!
//! Scene parsing and mesh tessellation live outside the simulation. The world
//! only needs the initial shapes and a way to turn a shape and transform into
//! collision bounds.

use std::collections::HashMap;

use ember_physics::AABB;
use glam::{Mat4, Vec3};

use crate::render::{Material, ShapeKind};

/// One static shape of the initial scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneShape {
    pub shape: ShapeKind,
    pub transform: Mat4,
    pub material: Material,
}

impl SceneShape {
    pub fn new(shape: ShapeKind, transform: Mat4, material: Material) -> Self {
        Self {
            shape,
            transform,
            material,
        }
    }
}

/// Lighting coefficients and starting camera, passed through untouched
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGlobals {
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    pub camera_position: Vec3,
    pub camera_look: Vec3,
}

impl Default for SceneGlobals {
    fn default() -> Self {
        Self {
            ka: 0.5,
            kd: 0.5,
            ks: 0.5,
            camera_position: Vec3::new(0.0, 1.0, 0.0),
            camera_look: Vec3::NEG_Z,
        }
    }
}

/// Supplies the initial scene
pub trait SceneSource {
    fn shapes(&self) -> Vec<SceneShape>;

    fn globals(&self) -> SceneGlobals {
        SceneGlobals::default()
    }
}

/// In-memory scene
#[derive(Debug, Clone, Default)]
pub struct StaticScene {
    pub shapes: Vec<SceneShape>,
    pub globals: SceneGlobals,
}

impl StaticScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(mut self, shape: SceneShape) -> Self {
        self.shapes.push(shape);
        self
    }
}

impl SceneSource for StaticScene {
    fn shapes(&self) -> Vec<SceneShape> {
        self.shapes.clone()
    }

    fn globals(&self) -> SceneGlobals {
        self.globals.clone()
    }
}

/// Computes an entity's collision bounds from its shape and transform.
/// `None` means the shape does not collide.
pub trait AabbProvider {
    fn bounds(&self, shape: ShapeKind, transform: &Mat4) -> Option<AABB>;
}

/// Exact bounds of the ideal unit primitives
///
/// Every primitive fits the unit cube `[-0.5, 0.5]^3`, so the bound is that
/// cube's eight corners transformed. Sky cubes never collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdealBounds;

impl AabbProvider for IdealBounds {
    fn bounds(&self, shape: ShapeKind, transform: &Mat4) -> Option<AABB> {
        match shape {
            ShapeKind::SkyCube => None,
            ShapeKind::Cube | ShapeKind::Sphere | ShapeKind::Cylinder | ShapeKind::Cone => {
                Some(AABB::CUBE_UNIT.transform(transform))
            }
        }
    }
}

/// Bounds from tessellated mesh vertices
///
/// Each registered mesh's local bounding box is transformed per entity.
/// Unregistered shapes fall back to [`IdealBounds`].
#[derive(Debug, Clone, Default)]
pub struct MeshBounds {
    local: HashMap<ShapeKind, AABB>,
}

impl MeshBounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh by its vertex positions. Empty meshes are ignored.
    pub fn with_mesh(mut self, shape: ShapeKind, vertices: &[Vec3]) -> Self {
        if let Some(bounds) = AABB::from_points(vertices) {
            self.local.insert(shape, bounds);
        }
        self
    }
}

impl AabbProvider for MeshBounds {
    fn bounds(&self, shape: ShapeKind, transform: &Mat4) -> Option<AABB> {
        if shape == ShapeKind::SkyCube {
            return None;
        }
        match self.local.get(&shape) {
            Some(local) => Some(local.transform(transform)),
            None => IdealBounds.bounds(shape, transform),
        }
    }
}
