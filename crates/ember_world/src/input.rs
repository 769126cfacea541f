//! Player input state
//!
//! Key events set or clear held actions; pointer deltas rotate the look
//! direction. The player behaviour reads this once per update.

use std::collections::HashSet;

use glam::{Quat, Vec2, Vec3};

/// Pointer-delta to radians
pub const ROTATE_SENSITIVITY: f32 = 0.005;

/// Discrete player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Jump,
    Fire,
}

/// Held actions and look direction
#[derive(Debug, Clone)]
pub struct InputState {
    held: HashSet<Action>,
    look: Vec3,
    up: Vec3,
    last_pointer: Option<Vec2>,
    sensitivity: f32,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            held: HashSet::new(),
            look: Vec3::NEG_Z,
            up: Vec3::Y,
            last_pointer: None,
            sensitivity: ROTATE_SENSITIVITY,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look along `look`. A zero vector leaves the direction unchanged.
    pub fn set_look(&mut self, look: Vec3) {
        let look = look.normalize_or_zero();
        if look != Vec3::ZERO {
            self.look = look;
        }
    }

    pub fn key_down(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn key_up(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Feed an absolute pointer position. The first call only records it.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let pos = Vec2::new(x, y);
        let Some(last) = self.last_pointer.replace(pos) else {
            return;
        };
        let delta = pos - last;

        let yaw = Quat::from_axis_angle(Vec3::Y, -delta.x * self.sensitivity);
        self.look = (yaw * self.look).normalize();

        let right = self.look.cross(self.up).normalize_or_zero();
        if right != Vec3::ZERO {
            let pitch = Quat::from_axis_angle(right, -delta.y * self.sensitivity);
            let pitched = (pitch * self.look).normalize();
            // Never pitch through the pole
            if pitched.y.abs() < 0.99 {
                self.look = pitched;
            }
        }
    }

    /// Unit look direction
    pub fn look(&self) -> Vec3 {
        self.look
    }

    /// Look direction projected onto the ground plane
    pub fn look_flat(&self) -> Vec3 {
        Vec3::new(self.look.x, 0.0, self.look.z).normalize_or_zero()
    }

    /// Unit vector to the player's left on the ground plane
    pub fn left_flat(&self) -> Vec3 {
        self.up.cross(self.look_flat()).normalize_or_zero()
    }
}
