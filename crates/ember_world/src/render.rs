//! Render-facing data
//!
//! The simulation never draws anything. It carries a shape kind and material
//! per entity and exposes a read-only snapshot each tick.

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Primitive shape used to look up a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Cube,
    Sphere,
    Cylinder,
    Cone,
    /// Inward-facing cube drawn around the camera
    SkyCube,
}

/// Surface material, passed through to the renderer untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    /// Optional texture path
    pub texture: Option<String>,
    /// Texture blend factor
    pub blend: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::splat(0.5),
            shininess: 10.0,
            texture: None,
            blend: 0.0,
        }
    }
}

impl Material {
    /// Plain coloured material
    pub fn solid(diffuse: Vec3) -> Self {
        Self {
            ambient: diffuse * 0.2,
            diffuse,
            ..Default::default()
        }
    }

    /// Textured material as used by enemies
    pub fn textured(path: impl Into<String>, blend: f32) -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::new(0.0, 0.1, 0.0),
            specular: Vec3::splat(0.5),
            shininess: 10.0,
            texture: Some(path.into()),
            blend,
        }
    }

    /// The tinted variant shown while an entity flashes after a hit
    pub fn damaged(&self) -> Self {
        Self {
            ambient: Vec3::new(1.0, 0.5, 0.5),
            diffuse: Vec3::new(1.0, 0.75, 0.5),
            specular: Vec3::new(1.0, 0.75, 0.5),
            shininess: 1.0,
            texture: self.texture.clone(),
            blend: 1.0,
        }
    }

    /// Dark sphere material used for burst fragments
    pub fn fragment() -> Self {
        Self {
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::ONE,
            specular: Vec3::ZERO,
            shininess: 1.0,
            texture: None,
            blend: 0.0,
        }
    }
}

/// Enemy skins, one picked at random per spawn
pub const ENEMY_TEXTURES: [&str; 4] = [
    "textures/alien.png",
    "textures/goblin.png",
    "textures/slime.png",
    "textures/ufo.png",
];

/// Per-entity render state
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInfo {
    pub shape: ShapeKind,
    pub material: Material,
    pub visible: bool,
}

impl RenderInfo {
    /// Visible shape with a material
    pub fn new(shape: ShapeKind, material: Material) -> Self {
        Self {
            shape,
            material,
            visible: true,
        }
    }

    /// Hidden from the snapshot
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// One entry of the per-tick render snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub transform: Mat4,
    /// Inverse-transpose of the upper 3x3, for normals
    pub normal_matrix: Mat3,
    pub material: Material,
    pub shape: ShapeKind,
}

/// Inverse-transpose of a transform's linear part
pub fn normal_matrix(transform: &Mat4) -> Mat3 {
    Mat3::from_mat4(*transform).transpose().inverse()
}
