//! Simulation configuration
//!
//! All sections are optional in TOML; anything missing takes its default.
//!
//! ```toml
//! seed = 7
//! two_pass_tick = true
//!
//! [physics]
//! max_passes = 4
//!
//! [streaming]
//! cell_size = 20.0
//! activation_radius = 1
//! deactivation_radius = 2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::behavior::{EnemyConfig, PlayerConfig, ProjectileConfig};
use crate::error::{Result, WorldError};
use crate::streaming::StreamingConfig;
use ember_physics::PhysicsConfig;

/// Top-level simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for burst directions and enemy skins
    pub seed: u64,

    /// Run the update pass twice per tick, reaping after each
    pub two_pass_tick: bool,

    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub projectile: ProjectileConfig,
    pub streaming: StreamingConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            two_pass_tick: false,
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            projectile: ProjectileConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse from a TOML string and validate
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::info!("Loading simulation config from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_two_pass_tick(mut self, enabled: bool) -> Self {
        self.two_pass_tick = enabled;
        self
    }

    pub fn with_streaming(mut self, streaming: StreamingConfig) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn without_streaming(mut self) -> Self {
        self.streaming.enabled = false;
        self
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        self.physics.validate()?;
        if self.streaming.enabled {
            self.streaming.validate()?;
        }

        let player = &self.player;
        if player.max_horizontal_speed <= 0.0 || player.terminal_velocity <= 0.0 {
            return Err(WorldError::Config("player speed caps must be positive".into()));
        }
        if player.half_extents.min_element() <= 0.0 {
            return Err(WorldError::Config("player.half_extents must be positive".into()));
        }
        if self.enemy.hit_points <= 0.0 || self.enemy.size <= 0.0 {
            return Err(WorldError::Config("enemy hit_points and size must be positive".into()));
        }
        if self.projectile.bullet_range <= 0.0 || self.projectile.burst.max_distance <= 0.0 {
            return Err(WorldError::Config("projectile ranges must be positive".into()));
        }
        Ok(())
    }
}
