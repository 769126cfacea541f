//! # ember_structures - Simulation Storage
//!
//! Generational containers used by the simulation core:
//! - SlotMap: arena with stale-key detection and checkout/restore

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod slot_map;

pub use slot_map::{SlotKey, SlotMap};

pub mod prelude {
    pub use crate::slot_map::{SlotKey, SlotMap};
}
