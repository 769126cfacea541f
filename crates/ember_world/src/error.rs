//! Error types for the world

use ember_physics::PhysicsError;
use thiserror::Error;

/// World errors
#[derive(Debug, Error)]
pub enum WorldError {
    /// A collision precondition was violated
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Invalid simulation configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Handle does not refer to a live entity
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for world operations
pub type Result<T> = std::result::Result<T, WorldError>;
