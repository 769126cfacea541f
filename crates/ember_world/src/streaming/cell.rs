//! Grid cell keys

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Integer coordinate of a square world cell on the XZ plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub x: i32,
    pub z: i32,
}

impl CellKey {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Cell containing a world position
    pub fn containing(position: Vec3, cell_size: f32) -> Self {
        Self {
            x: (position.x / cell_size).floor() as i32,
            z: (position.z / cell_size).floor() as i32,
        }
    }

    pub const fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Chebyshev distance in cells
    pub fn distance(&self, other: &CellKey) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// World-space corner with the smallest coordinates (y = 0)
    pub fn origin(&self, cell_size: f32) -> Vec3 {
        Vec3::new(self.x as f32 * cell_size, 0.0, self.z as f32 * cell_size)
    }

    /// World-space centre on the ground plane
    pub fn center(&self, cell_size: f32) -> Vec3 {
        self.origin(cell_size) + Vec3::new(cell_size * 0.5, 0.0, cell_size * 0.5)
    }

    /// Whether a position lies in this cell. The low edges are inside and the
    /// high edges are not, so every position belongs to exactly one cell.
    pub fn contains(&self, position: Vec3, cell_size: f32) -> bool {
        Self::containing(position, cell_size) == *self
    }

    /// Generation seed for this cell
    pub fn seed(&self, world_seed: u64) -> u64 {
        let packed = ((self.x as u32 as u64) << 32) | (self.z as u32 as u64);
        splitmix64(world_seed ^ splitmix64(packed))
    }
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
