//! Physics command queue for cross-thread requests
//!
//! Game logic running off the stepping thread records commands here; the
//! owner of the world drains the queue with `PhysicsWorld::apply_commands`
//! before the next `advance`.

use crate::physics::body::{BodyId, Pose};
use glam::Vec2;
use std::sync::{Arc, RwLock};

/// Physics command to be executed on the stepping thread
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsCommand {
    /// Apply a force over the next step
    ApplyForce {
        body: BodyId,
        force: Vec2,
    },

    /// Apply an instantaneous impulse at the next step
    ApplyImpulse {
        body: BodyId,
        impulse: Vec2,
    },

    /// Set the velocity of a body
    SetVelocity {
        body: BodyId,
        linear: Vec2,
        angular: f32,
    },

    /// Move a body without going through the solver
    Teleport {
        body: BodyId,
        pose: Pose,
    },
}

impl PhysicsCommand {
    pub fn body(&self) -> BodyId {
        match self {
            PhysicsCommand::ApplyForce { body, .. }
            | PhysicsCommand::ApplyImpulse { body, .. }
            | PhysicsCommand::SetVelocity { body, .. }
            | PhysicsCommand::Teleport { body, .. } => *body,
        }
    }
}

/// Thread-safe physics command queue
pub type PhysicsCommandQueue = Arc<RwLock<Vec<PhysicsCommand>>>;

/// Create a new physics command queue
pub fn create_command_queue() -> PhysicsCommandQueue {
    Arc::new(RwLock::new(Vec::new()))
}

/// Take every queued command, leaving the queue empty
///
/// A poisoned lock still yields its commands.
pub fn drain_queue(queue: &PhysicsCommandQueue) -> Vec<PhysicsCommand> {
    let mut guard = match queue.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    std::mem::take(&mut *guard)
}
