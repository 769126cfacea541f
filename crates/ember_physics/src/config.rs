//! Collision configuration

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Collision resolution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Scan rounds per `resolve_move` call
    pub max_passes: u32,

    /// Downward probe distance used for ground checks
    pub ground_probe_epsilon: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_passes: 4,
            ground_probe_epsilon: 0.0001,
        }
    }
}

impl PhysicsConfig {
    /// Set the number of resolution passes
    pub fn with_max_passes(mut self, max_passes: u32) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Reject settings the resolver cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_passes == 0 {
            return Err(PhysicsError::InvalidConfig("max_passes must be at least 1".into()));
        }
        if !(self.ground_probe_epsilon > 0.0) {
            return Err(PhysicsError::InvalidConfig(
                "ground_probe_epsilon must be positive".into(),
            ));
        }
        Ok(())
    }
}
