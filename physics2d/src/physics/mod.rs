//! 2D rigid-body simulation
//!
//! A `PhysicsWorld` owns its bodies behind generation-counted `BodyId`
//! handles and consumes wall-clock time in fixed steps. Game objects ride on
//! bodies through the `PhysicsEntity` adapter.

pub mod accumulator;
pub mod body;
pub mod collision;
pub mod commands;
pub mod entity;
pub mod events;
pub mod parallel;
pub mod solver;
pub mod world;


// Re-export commonly used types
pub use accumulator::FixedStepAccumulator;
pub use body::{Body, BodyDesc, BodyId, BodyType, CollisionFilter, Pose, UserTag};
pub use collision::{Aabb, ContactManifold, Shape};
pub use commands::{create_command_queue, drain_queue, PhysicsCommand, PhysicsCommandQueue};
pub use entity::PhysicsEntity;
pub use events::{ContactEvent, ContactPhase, EventCallback};
pub use parallel::advance_all;
pub use solver::{combined_friction, combined_restitution, SolverSettings};
pub use world::{PhysicsWorld, WorldId};
