//! Fixed-timestep 2D rigid-body physics
//!
//! This crate provides a self-contained 2D physics world (bodies, broad and
//! narrow phase collision, an impulse solver, contact events) together with
//! the adapter and scene layers that let game entities ride on simulated
//! bodies with interpolated, frame-rate independent poses.

pub mod config;
pub mod error;
pub mod physics;
pub mod scene;

// Re-export commonly used types
pub mod prelude {
    // Physics world types
    pub use crate::physics::{
        advance_all, Body, BodyDesc, BodyId, BodyType, CollisionFilter, ContactEvent,
        ContactManifold, ContactPhase, PhysicsCommand, PhysicsCommandQueue, PhysicsEntity,
        PhysicsWorld, Pose, Shape, UserTag, WorldId,
    };

    // Config and error types
    pub use crate::config::{BroadPhaseKind, PhysicsConfig};
    pub use crate::error::{PhysicsError, Result};

    // Scene types
    pub use crate::scene::{Scene, Transform2D};

    // Math types
    pub use glam::Vec2;
}

/// Initialize logging for the physics core
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
