//! Axis-aligned bounding boxes for collision

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box in world space
///
/// The extents never change once a box is built; movement only translates
/// both corners by the same delta.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// The ideal unit cube centred on the origin, `[-0.5, 0.5]` on every axis
    pub const CUBE_UNIT: Self = Self {
        min: Vec3::splat(-0.5),
        max: Vec3::splat(0.5),
    };

    /// Create from min and max points
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create from center and half-extents
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box containing every point. Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for &point in rest {
            aabb.min = aabb.min.min(point);
            aabb.max = aabb.max.max(point);
        }
        Some(aabb)
    }

    /// Get the center point
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the size (full extents)
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if two boxes overlap.
    ///
    /// Overlap is strict on every axis: boxes that only share a face, edge
    /// or corner do not collide.
    #[inline]
    pub fn collides(&self, other: &AABB) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Minimal translation that moves `self` out of `other`.
    ///
    /// Six single-axis candidates are tried in the order -x, +x, -y, +y, -z, +z
    /// (pushing `self` to each face of `other`). A later candidate replaces the
    /// current one only if its magnitude is strictly smaller, so ties keep the
    /// earlier face.
    pub fn separation_vector(&self, other: &AABB) -> Vec3 {
        let candidates = self.separation_candidates(other);

        let mut best = candidates[0];
        let mut best_dist = best.abs().max_element();
        for candidate in &candidates[1..] {
            let dist = candidate.abs().max_element();
            if dist < best_dist {
                best_dist = dist;
                best = *candidate;
            }
        }
        best
    }

    /// The six face-aligned separations considered by
    /// [`separation_vector`](Self::separation_vector)
    pub fn separation_candidates(&self, other: &AABB) -> [Vec3; 6] {
        [
            Vec3::new(other.min.x - self.max.x, 0.0, 0.0),
            Vec3::new(other.max.x - self.min.x, 0.0, 0.0),
            Vec3::new(0.0, other.min.y - self.max.y, 0.0),
            Vec3::new(0.0, other.max.y - self.min.y, 0.0),
            Vec3::new(0.0, 0.0, other.min.z - self.max.z),
            Vec3::new(0.0, 0.0, other.max.z - self.min.z),
        ]
    }

    /// Shift both corners by `delta`
    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.min += delta;
        self.max += delta;
    }

    /// Copy shifted by `delta`
    #[inline]
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Transform the AABB by a matrix (result is still axis-aligned)
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let corners = self.corners();
        let first = matrix.transform_point3(corners[0]);
        let mut result = Self::new(first, first);
        for corner in &corners[1..] {
            let transformed = matrix.transform_point3(*corner);
            result.min = result.min.min(transformed);
            result.max = result.max.max(transformed);
        }
        result
    }

    /// Get the 8 corners of the AABB
    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }
}
