//! Health for damageable entities

use serde::{Deserialize, Serialize};

/// Hit points of a damageable entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Current health
    pub current: f32,
    /// Maximum health
    pub max: f32,
    /// Whether this entity is dead
    #[serde(skip)]
    pub is_dead: bool,
}

impl Health {
    /// Create at full health
    pub fn new(max_health: f32) -> Self {
        Self {
            current: max_health,
            max: max_health,
            is_dead: false,
        }
    }

    /// Apply damage. Returns true if this hit killed the entity.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.is_dead {
            return false;
        }

        self.current = (self.current - amount.max(0.0)).max(0.0);
        if self.current <= 0.0 {
            self.is_dead = true;
            log::debug!("Health depleted ({} max)", self.max);
            return true;
        }
        false
    }

}

impl Default for Health {
    fn default() -> Self {
        Self::new(3.0)
    }
}
