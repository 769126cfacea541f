//! World streaming
//!
//! The ground plane is split into square cells. Cells near the player are
//! generated on demand from their key and destroyed again once the player is
//! far enough away. The deactivation radius is larger than the activation
//! radius so that walking back and forth over a cell edge never thrashes.

mod cell;
mod streamer;

pub use cell::CellKey;
pub use streamer::GridStreamer;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};

/// Configuration for the streaming system
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Run the streamer at all
    pub enabled: bool,

    /// Edge length of a cell in world units
    pub cell_size: f32,

    /// Cells within this Chebyshev distance of the player are generated
    pub activation_radius: i32,

    /// Cells beyond this distance are destroyed (must be > activation_radius)
    pub deactivation_radius: i32,

    /// Obstacle slots per cell edge
    pub subgrid: u32,

    /// Chance that an obstacle slot is filled
    pub obstacle_chance: f32,

    /// Obstacle height range
    pub obstacle_min_height: f32,
    pub obstacle_max_height: f32,

    /// No obstacles within this distance of the world origin
    pub origin_clearance: f32,

    /// Chance that a generated cell offers an enemy spawn point
    pub spawn_point_chance: f32,

    /// No enemies before this many seconds have passed
    pub enemy_spawn_grace: f32,

    /// Seconds between enemy spawns
    pub enemy_spawn_interval: f32,

    /// Spawn points closer than this to the player are not used
    pub min_spawn_distance: f32,

    /// Cap on live enemies
    pub max_enemies: usize,

    /// Seed for cell generation and enemy spawning
    pub seed: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cell_size: 20.0,
            activation_radius: 1,
            deactivation_radius: 2,
            subgrid: 4,
            obstacle_chance: 0.3,
            obstacle_min_height: 0.5,
            obstacle_max_height: 3.0,
            origin_clearance: 4.0,
            spawn_point_chance: 0.5,
            enemy_spawn_grace: 5.0,
            enemy_spawn_interval: 3.0,
            min_spawn_distance: 8.0,
            max_enemies: 16,
            seed: 0x5EED,
        }
    }
}

impl StreamingConfig {
    /// Set activation and deactivation radii
    pub fn with_radii(mut self, activation: i32, deactivation: i32) -> Self {
        self.activation_radius = activation;
        self.deactivation_radius = deactivation;
        self
    }

    /// Disable enemy spawning
    pub fn without_enemies(mut self) -> Self {
        self.max_enemies = 0;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size > 0.0) {
            return Err(WorldError::Config("streaming.cell_size must be positive".into()));
        }
        if self.activation_radius < 0 {
            return Err(WorldError::Config(
                "streaming.activation_radius must not be negative".into(),
            ));
        }
        if self.deactivation_radius <= self.activation_radius {
            return Err(WorldError::Config(format!(
                "streaming.deactivation_radius ({}) must exceed activation_radius ({})",
                self.deactivation_radius, self.activation_radius
            )));
        }
        if self.subgrid == 0 {
            return Err(WorldError::Config("streaming.subgrid must be at least 1".into()));
        }
        for (name, chance) in [
            ("obstacle_chance", self.obstacle_chance),
            ("spawn_point_chance", self.spawn_point_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(WorldError::Config(format!("streaming.{} must be in [0, 1]", name)));
            }
        }
        if self.obstacle_min_height > self.obstacle_max_height || self.obstacle_min_height <= 0.0 {
            return Err(WorldError::Config("streaming obstacle heights are invalid".into()));
        }
        if !(self.enemy_spawn_interval > 0.0) {
            return Err(WorldError::Config(
                "streaming.enemy_spawn_interval must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Counters reported by the streamer
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StreamingStats {
    pub active_cells: usize,
    pub cells_generated: u64,
    pub cells_destroyed: u64,
    pub entities_spawned: u64,
    pub entities_destroyed: u64,
    pub enemies_spawned: u64,
    pub spawn_points: usize,
}

/// Result of a reconcile
#[derive(Clone, Debug, Default)]
pub struct StreamingUpdate {
    /// Cells generated by this call
    pub activated: Vec<CellKey>,
    /// Cells destroyed by this call
    pub deactivated: Vec<CellKey>,
}

impl StreamingUpdate {
    /// Check if there are any updates
    pub fn has_updates(&self) -> bool {
        !self.activated.is_empty() || !self.deactivated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(StreamingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_hysteresis_required() {
        let config = StreamingConfig::default().with_radii(2, 2);
        assert!(matches!(config.validate(), Err(WorldError::Config(_))));
    }
}
