//! Physics world owning every body and running the fixed-step loop
//!
//! Each step runs, in order: force integration, broad phase, narrow phase
//! with contact resolution, position integration and finally begin/end
//! callback dispatch. A world is not internally synchronized; independent
//! worlds can be stepped on different threads (see `parallel`).

use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::physics::accumulator::FixedStepAccumulator;
use crate::physics::body::{Body, BodyDesc, BodyId, Pose};
use crate::physics::collision::broad_phase::{find_pairs, BroadPhaseEntry};
use crate::physics::collision::narrow_phase::test_collision;
use crate::physics::commands::PhysicsCommand;
use crate::physics::events::{diff_pairs, ContactEvent, EventCallback, PairRecord, PairSet};
use crate::physics::solver::{resolve_contact, SolverSettings};
use glam::Vec2;
use slotmap::SlotMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info, trace, warn};

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldId(u64);

/// Simulation authority for one self-contained set of bodies
pub struct PhysicsWorld {
    id: WorldId,
    config: PhysicsConfig,
    solver: SolverSettings,
    accumulator: FixedStepAccumulator,
    bodies: SlotMap<BodyId, Body>,
    /// Non-sensor pairs touching at the end of the last step
    contacts: PairSet,
    /// Sensor pairs overlapping at the end of the last step
    overlaps: PairSet,
    contact_callback: Option<EventCallback>,
    sensor_callback: Option<EventCallback>,
    accepting: bool,
    halted: bool,
    step_count: u64,
}

impl PhysicsWorld {
    /// Create a world with a validated, immutable stepping policy
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        let id = WorldId(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed));
        info!(
            world = id.0,
            gravity = ?config.gravity,
            fixed_timestep = config.fixed_timestep,
            max_substeps = config.max_substeps,
            "Initializing physics world"
        );

        Ok(Self {
            id,
            solver: SolverSettings::from(&config),
            accumulator: FixedStepAccumulator::new(config.fixed_timestep, config.max_substeps),
            config,
            bodies: SlotMap::with_key(),
            contacts: PairSet::new(),
            overlaps: PairSet::new(),
            contact_callback: None,
            sensor_callback: None,
            accepting: true,
            halted: false,
            step_count: 0,
        })
    }

    /// Create a world from the three stepping parameters, default tunables otherwise
    pub fn configure(gravity: Vec2, fixed_timestep: f32, max_substeps: u32) -> Result<Self> {
        Self::new(PhysicsConfig::new(gravity, fixed_timestep, max_substeps))
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.config.fixed_timestep
    }

    /// Insert a body built from `desc`
    pub fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyId> {
        if !self.accepting {
            return Err(PhysicsError::NotAccepting);
        }
        let body = Body::from_desc(desc)?;
        let body_type = body.body_type();
        let id = self.bodies.insert(body);
        debug!(world = self.id.0, body = ?id, ?body_type, "Created body");
        Ok(id)
    }

    /// Remove a body; stale ids are reported and otherwise ignored
    pub fn destroy_body(&mut self, id: BodyId) -> Result<Body> {
        match self.bodies.remove(id) {
            Some(body) => {
                debug!(world = self.id.0, body = ?id, "Destroyed body");
                Ok(body)
            }
            None => {
                debug!(world = self.id.0, body = ?id, "Ignoring destroy of stale handle");
                Err(PhysicsError::StaleHandle(id))
            }
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(id)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    fn body_mut(&mut self, id: BodyId) -> Result<&mut Body> {
        self.bodies.get_mut(id).ok_or(PhysicsError::StaleHandle(id))
    }

    /// Accumulate a force applied over the next step
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) -> Result<()> {
        self.body_mut(id)?.add_force(force);
        Ok(())
    }

    /// Accumulate an impulse applied at the start of the next step
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) -> Result<()> {
        self.body_mut(id)?.add_impulse(impulse);
        Ok(())
    }

    /// Overwrite the velocity; static bodies keep zero velocity
    pub fn set_velocity(&mut self, id: BodyId, linear: Vec2, angular: f32) -> Result<()> {
        self.body_mut(id)?.set_velocity(linear, angular);
        Ok(())
    }

    /// Teleport a body outside the solver
    pub fn set_pose(&mut self, id: BodyId, pose: Pose) -> Result<()> {
        self.body_mut(id)?.set_pose(pose);
        Ok(())
    }

    /// Apply queued commands; returns how many hit a live body
    pub fn apply_commands(&mut self, commands: impl IntoIterator<Item = PhysicsCommand>) -> usize {
        let mut applied = 0;
        for command in commands {
            let result = match command {
                PhysicsCommand::ApplyForce { body, force } => self.apply_force(body, force),
                PhysicsCommand::ApplyImpulse { body, impulse } => self.apply_impulse(body, impulse),
                PhysicsCommand::SetVelocity {
                    body,
                    linear,
                    angular,
                } => self.set_velocity(body, linear, angular),
                PhysicsCommand::Teleport { body, pose } => self.set_pose(body, pose),
            };
            match result {
                Ok(()) => applied += 1,
                Err(err) => trace!(world = self.id.0, %err, "Skipping physics command"),
            }
        }
        applied
    }

    /// Register the callback for non-sensor begin/end contacts, replacing any previous one
    pub fn set_contact_callback(&mut self, callback: impl FnMut(&ContactEvent) + Send + 'static) {
        self.contact_callback = Some(Box::new(callback));
    }

    /// Register the callback for sensor begin/end overlaps, replacing any previous one
    pub fn set_sensor_callback(&mut self, callback: impl FnMut(&ContactEvent) + Send + 'static) {
        self.sensor_callback = Some(Box::new(callback));
    }

    /// Consume wall-clock time in fixed steps; returns the number of steps run
    pub fn advance(&mut self, wall_delta_time: f32) -> Result<u32> {
        self.advance_with(wall_delta_time, |_| {})
    }

    /// Like `advance`, calling `on_step` after every completed step
    pub fn advance_with(
        &mut self,
        wall_delta_time: f32,
        mut on_step: impl FnMut(&PhysicsWorld),
    ) -> Result<u32> {
        if self.halted {
            return Err(PhysicsError::Halted);
        }
        if !(wall_delta_time.is_finite() && wall_delta_time >= 0.0) {
            return Err(PhysicsError::InvalidTimeDelta(wall_delta_time));
        }

        let steps = self.accumulator.accumulate(wall_delta_time);
        for _ in 0..steps {
            self.run_step()?;
            on_step(self);
        }
        Ok(steps)
    }

    /// Run exactly one fixed step, bypassing the accumulator
    pub fn step(&mut self) -> Result<()> {
        if self.halted {
            return Err(PhysicsError::Halted);
        }
        self.run_step()
    }

    fn run_step(&mut self) -> Result<()> {
        let dt = self.config.fixed_timestep;
        let gravity = self.config.gravity;

        for body in self.bodies.values_mut() {
            body.integrate_forces(gravity, dt);
        }

        let entries: Vec<BroadPhaseEntry> = self
            .bodies
            .iter()
            .map(|(id, body)| BroadPhaseEntry {
                id,
                aabb: body.shape.world_aabb(body.pose.position, body.pose.rotation),
                body_type: body.body_type,
                filter: body.filter,
            })
            .collect();
        let pairs = find_pairs(&entries, self.config.broad_phase, self.config.kinematic_pairs);

        let mut contacts = PairSet::new();
        let mut overlaps = PairSet::new();
        for &(id_a, id_b) in &pairs {
            let Some([a, b]) = self.bodies.get_disjoint_mut([id_a, id_b]) else {
                continue;
            };
            let Some(manifold) = test_collision(&a.shape, a.pose, &b.shape, b.pose) else {
                continue;
            };

            if a.is_sensor || b.is_sensor {
                overlaps.insert(
                    (id_a, id_b),
                    PairRecord {
                        tag_a: a.user_tag,
                        tag_b: b.user_tag,
                        manifold: None,
                    },
                );
            } else {
                resolve_contact(a, b, &manifold, &self.solver);
                contacts.insert(
                    (id_a, id_b),
                    PairRecord {
                        tag_a: a.user_tag,
                        tag_b: b.user_tag,
                        manifold: Some(manifold),
                    },
                );
            }
        }

        for (id, body) in self.bodies.iter_mut() {
            body.integrate_position(dt);
            if !body.is_finite() {
                self.halted = true;
                error!(
                    world = self.id.0,
                    body = ?id,
                    position = ?body.pose.position,
                    velocity = ?body.linear_velocity,
                    "Non-finite body state, halting physics world"
                );
                return Err(PhysicsError::NonFiniteState {
                    body: id,
                    position: body.pose.position,
                    velocity: body.linear_velocity,
                });
            }
        }

        let previous_contacts = std::mem::take(&mut self.contacts);
        let previous_overlaps = std::mem::take(&mut self.overlaps);
        self.dispatch_changes(&previous_contacts, &contacts, &previous_overlaps, &overlaps);

        trace!(
            world = self.id.0,
            step = self.step_count,
            candidates = pairs.len(),
            contacts = contacts.len(),
            overlaps = overlaps.len(),
            "Physics step"
        );

        self.contacts = contacts;
        self.overlaps = overlaps;
        self.step_count += 1;
        Ok(())
    }

    fn dispatch_changes(
        &mut self,
        previous_contacts: &PairSet,
        contacts: &PairSet,
        previous_overlaps: &PairSet,
        overlaps: &PairSet,
    ) {
        if let Some(callback) = self.contact_callback.as_mut() {
            diff_pairs(previous_contacts, contacts, |event| callback(&event));
        }
        if let Some(callback) = self.sensor_callback.as_mut() {
            diff_pairs(previous_overlaps, overlaps, |event| callback(&event));
        }
    }

    /// Fraction of a step carried over, for render interpolation
    pub fn interpolation_alpha(&self) -> f32 {
        self.accumulator.interpolation_alpha()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Seconds of wall-clock time discarded by the substep cap
    pub fn dropped_time(&self) -> f64 {
        self.accumulator.dropped_time()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Whether two bodies were in (non-sensor) contact at the end of the last step
    pub fn is_touching(&self, a: BodyId, b: BodyId) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.contacts.contains_key(&key)
    }

    /// Whether two bodies overlapped as a sensor pair at the end of the last step
    pub fn is_overlapping(&self, a: BodyId, b: BodyId) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.overlaps.contains_key(&key)
    }

    /// Stop accepting bodies and destroy every live one
    ///
    /// Pairs still touching get their End event before the bodies go.
    pub fn shutdown(&mut self) {
        if !self.accepting {
            warn!(world = self.id.0, "Physics world already shut down");
            return;
        }
        self.accepting = false;
        info!(
            world = self.id.0,
            bodies = self.bodies.len(),
            steps = self.step_count,
            "Shutting down physics world"
        );
        let contacts = std::mem::take(&mut self.contacts);
        let overlaps = std::mem::take(&mut self.overlaps);
        self.dispatch_changes(&contacts, &PairSet::new(), &overlaps, &PairSet::new());
        self.bodies.clear();
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("step_count", &self.step_count)
            .field("halted", &self.halted)
            .finish_non_exhaustive()
    }
}
