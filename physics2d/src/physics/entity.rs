//! Adapter giving a game object a simulated body
//!
//! `PhysicsEntity` owns at most one body handle. It pulls the body pose back
//! after every step, keeping the last two poses so rendering can blend
//! between them with the world's interpolation alpha.

use crate::error::{PhysicsError, Result};
use crate::physics::body::{BodyDesc, BodyId, Pose};
use crate::physics::world::{PhysicsWorld, WorldId};
use glam::Vec2;
use tracing::{debug, trace};

/// Handle plus the world that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Attachment {
    world: WorldId,
    body: BodyId,
}

/// Simulated-motion capability composed by game objects
#[derive(Debug, Clone)]
pub struct PhysicsEntity {
    desc: BodyDesc,
    attachment: Option<Attachment>,
    previous: Pose,
    current: Pose,
}

impl PhysicsEntity {
    /// Create a detached adapter; the body is built from `desc` on attach
    pub fn new(desc: BodyDesc) -> Self {
        Self {
            previous: desc.pose,
            current: desc.pose,
            desc,
            attachment: None,
        }
    }

    pub fn desc(&self) -> &BodyDesc {
        &self.desc
    }

    /// Create the body in `world`
    pub fn attach(&mut self, world: &mut PhysicsWorld) -> Result<BodyId> {
        if self.attachment.is_some() {
            return Err(PhysicsError::DoubleAttach);
        }
        let body = world.create_body(&self.desc)?;
        self.attachment = Some(Attachment {
            world: world.id(),
            body,
        });
        self.previous = self.desc.pose;
        self.current = self.desc.pose;
        debug!(body = ?body, "Attached physics entity");
        Ok(body)
    }

    /// Destroy the held body; a no-op when not attached
    ///
    /// The last simulated pose and velocity are kept in the descriptor so a
    /// later `attach` resumes where the body left off.
    pub fn detach(&mut self, world: &mut PhysicsWorld) -> Result<()> {
        let Some(attachment) = self.attachment else {
            return Ok(());
        };
        if attachment.world != world.id() {
            return Err(PhysicsError::WorldMismatch);
        }
        self.attachment = None;

        match world.destroy_body(attachment.body) {
            Ok(body) => {
                self.desc.pose = body.pose();
                self.desc.linear_velocity = body.linear_velocity();
                self.desc.angular_velocity = body.angular_velocity();
                debug!(body = ?attachment.body, "Detached physics entity");
            }
            // World already dropped the body (teardown)
            Err(err) => debug!(%err, "Detached physics entity without a live body"),
        }
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    pub fn body_id(&self) -> Option<BodyId> {
        self.attachment.map(|attachment| attachment.body)
    }

    fn live_body(&self, world: &PhysicsWorld) -> Option<BodyId> {
        self.attachment
            .filter(|attachment| attachment.world == world.id())
            .map(|attachment| attachment.body)
    }

    /// Shift `current` into `previous` and read the body's new pose
    pub fn sync_from_physics(&mut self, world: &PhysicsWorld) {
        let Some(body) = self.live_body(world).and_then(|id| world.body(id)) else {
            return;
        };
        self.previous = self.current;
        self.current = body.pose();
    }

    /// Push an entity-authored pose into the body, outside the solver
    ///
    /// Both stored poses jump to `pose` so the teleport is not interpolated.
    pub fn sync_to_physics(&mut self, world: &mut PhysicsWorld, pose: Pose) {
        self.previous = pose;
        self.current = pose;
        self.desc.pose = pose;
        if let Some(id) = self.live_body(world) {
            if let Err(err) = world.set_pose(id, pose) {
                debug!(%err, "Pose sync skipped");
            }
        }
    }

    /// Blend of the last two simulated poses; `alpha` is `remainder / dt`
    pub fn interpolated_pose(&self, alpha: f32) -> Pose {
        self.previous.lerp(&self.current, alpha.clamp(0.0, 1.0))
    }

    pub fn previous_pose(&self) -> Pose {
        self.previous
    }

    pub fn current_pose(&self) -> Pose {
        self.current
    }

    /// Silently ignored when unattached
    pub fn apply_force(&self, world: &mut PhysicsWorld, force: Vec2) {
        if let Some(id) = self.live_body(world) {
            if let Err(err) = world.apply_force(id, force) {
                trace!(%err, "Force skipped");
            }
        }
    }

    /// Silently ignored when unattached
    pub fn apply_impulse(&self, world: &mut PhysicsWorld, impulse: Vec2) {
        if let Some(id) = self.live_body(world) {
            if let Err(err) = world.apply_impulse(id, impulse) {
                trace!(%err, "Impulse skipped");
            }
        }
    }

    /// Silently ignored when unattached
    pub fn set_velocity(&mut self, world: &mut PhysicsWorld, linear: Vec2, angular: f32) {
        match self.live_body(world) {
            Some(id) => {
                if let Err(err) = world.set_velocity(id, linear, angular) {
                    trace!(%err, "Velocity skipped");
                }
            }
            None => {
                // Remembered for the next attach
                self.desc.linear_velocity = linear;
                self.desc.angular_velocity = angular;
            }
        }
    }
}
