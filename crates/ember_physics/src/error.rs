//! Error types for collision handling

use thiserror::Error;

/// Collision system errors
///
/// These are precondition violations: they point at a bug upstream rather
/// than a runtime condition to recover from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// A collider was queried before its bounds were computed
    #[error("Collision shape not computed for {0}")]
    ShapeNotComputed(String),

    /// Something tried to move an immovable body
    #[error("Static body {0} cannot be moved")]
    StaticBodyMoved(String),

    /// A collision query was issued for something without a collider
    #[error("{0} has no collision shape")]
    NoCollider(String),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for collision operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
