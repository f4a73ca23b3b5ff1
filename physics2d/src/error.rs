//! Error types for the physics core

use crate::physics::BodyId;
use thiserror::Error;

/// Errors reported by the physics world and the entity adapter
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Body descriptor failed validation; nothing was inserted
    #[error("Invalid body spec: {0}")]
    InvalidBodySpec(String),

    /// Handle no longer refers to a live body
    #[error("Stale body handle: {0:?}")]
    StaleHandle(BodyId),

    /// `attach` called on an adapter that already holds a body
    #[error("Entity is already attached to a physics world")]
    DoubleAttach,

    /// World is being torn down and refuses new bodies
    #[error("Physics world is not accepting new bodies")]
    NotAccepting,

    /// Adapter was asked to detach from a world that does not own its body
    #[error("Body belongs to a different physics world")]
    WorldMismatch,

    /// Integration produced NaN or infinity; the world is halted
    #[error("Non-finite state on body {body:?}: position={position:?}, velocity={velocity:?}")]
    NonFiniteState {
        body: BodyId,
        position: glam::Vec2,
        velocity: glam::Vec2,
    },

    /// World was halted by an earlier invariant violation
    #[error("Physics world is halted after an invariant violation")]
    Halted,

    /// Scene entity is gone or carries no physics adapter
    #[error("Scene entity {0:?} has no physics body")]
    MissingEntity(hecs::Entity),

    /// Wall-clock delta was negative or non-finite
    #[error("Invalid time delta: {0}")]
    InvalidTimeDelta(f32),

    /// Configuration values are out of range
    #[error("Invalid physics config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PhysicsError>;
