//! Scene host pairing a hecs entity world with one physics world
//!
//! Each physics-driven entity carries a `PhysicsEntity` adapter and a
//! `Transform2D`. `Scene::update` advances the simulation, syncs every
//! adapter once per step and finally writes the interpolated pose into the
//! transform the renderer reads.

use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::physics::{BodyDesc, BodyId, PhysicsEntity, PhysicsWorld, Pose, UserTag};
use glam::Vec2;
use hecs::Entity;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Render-facing 2D transform component
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform2D {
    pub position: Vec2,
    pub rotation: f32,
}

impl From<Pose> for Transform2D {
    fn from(pose: Pose) -> Self {
        Self {
            position: pose.position,
            rotation: pose.rotation,
        }
    }
}

impl From<Transform2D> for Pose {
    fn from(transform: Transform2D) -> Self {
        Pose::new(transform.position, transform.rotation)
    }
}

/// Game entities plus the physics world they ride on
pub struct Scene {
    entities: hecs::World,
    physics: PhysicsWorld,
}

impl Scene {
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        Ok(Self {
            entities: hecs::World::new(),
            physics: PhysicsWorld::new(config)?,
        })
    }

    /// Spawn an entity with a body built from `desc`
    ///
    /// The body's user tag is the entity's bit pattern, so contact callbacks
    /// can map back with [`Scene::entity_for_tag`].
    pub fn spawn_body(&mut self, desc: BodyDesc) -> Result<Entity> {
        let entity = self.entities.spawn((Transform2D::from(desc.pose),));
        let tag = UserTag(entity.to_bits().get());

        let mut adapter = PhysicsEntity::new(desc.with_user_tag(tag));
        if let Err(err) = adapter.attach(&mut self.physics) {
            // Entity never became visible to callers
            if let Err(despawn_err) = self.entities.despawn(entity) {
                warn!(?entity, %despawn_err, "Failed to despawn entity after attach failure");
            }
            return Err(err);
        }
        self.entities
            .insert_one(entity, adapter)
            .map_err(|_| PhysicsError::MissingEntity(entity))?;

        debug!(?entity, "Spawned physics entity");
        Ok(entity)
    }

    /// Detach the entity's body, then despawn the entity
    pub fn despawn(&mut self, entity: Entity) -> Result<()> {
        if let Ok(adapter) = self.entities.query_one_mut::<&mut PhysicsEntity>(entity) {
            adapter.detach(&mut self.physics)?;
        }
        self.entities
            .despawn(entity)
            .map_err(|_| PhysicsError::MissingEntity(entity))?;
        debug!(?entity, "Despawned physics entity");
        Ok(())
    }

    /// Advance physics by one render frame; returns the steps run
    pub fn update(&mut self, frame_delta_time: f32) -> Result<u32> {
        let entities = &mut self.entities;
        let steps = self.physics.advance_with(frame_delta_time, |physics| {
            for (_, adapter) in entities.query_mut::<&mut PhysicsEntity>() {
                adapter.sync_from_physics(physics);
            }
        })?;

        let alpha = self.physics.interpolation_alpha();
        for (_, (adapter, transform)) in self
            .entities
            .query_mut::<(&PhysicsEntity, &mut Transform2D)>()
        {
            *transform = adapter.interpolated_pose(alpha).into();
        }
        Ok(steps)
    }

    /// Update independent scenes on the rayon pool; results are in input order
    pub fn update_all(scenes: &mut [Scene], frame_delta_time: f32) -> Vec<Result<u32>> {
        scenes
            .par_iter_mut()
            .map(|scene| scene.update(frame_delta_time))
            .collect()
    }

    /// Teleport an entity; the jump is not interpolated
    pub fn set_pose(&mut self, entity: Entity, pose: Pose) -> Result<()> {
        let (adapter, transform) = self
            .entities
            .query_one_mut::<(&mut PhysicsEntity, &mut Transform2D)>(entity)
            .map_err(|_| PhysicsError::MissingEntity(entity))?;
        adapter.sync_to_physics(&mut self.physics, pose);
        *transform = pose.into();
        Ok(())
    }

    pub fn apply_impulse(&mut self, entity: Entity, impulse: Vec2) -> Result<()> {
        let adapter = self
            .entities
            .query_one_mut::<&PhysicsEntity>(entity)
            .map_err(|_| PhysicsError::MissingEntity(entity))?;
        adapter.apply_impulse(&mut self.physics, impulse);
        Ok(())
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform2D> {
        self.entities
            .get::<&Transform2D>(entity)
            .ok()
            .map(|transform| *transform)
    }

    pub fn body_id(&self, entity: Entity) -> Option<BodyId> {
        self.entities
            .get::<&PhysicsEntity>(entity)
            .ok()
            .and_then(|adapter| adapter.body_id())
    }

    /// Resolve a callback tag to a live entity
    pub fn entity_for_tag(&self, tag: UserTag) -> Option<Entity> {
        Entity::from_bits(tag.0).filter(|entity| self.entities.contains(*entity))
    }

    pub fn entity_count(&self) -> u32 {
        self.entities.len()
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Detach every adapter, shut the physics world down and drop all entities
    pub fn teardown(&mut self) {
        info!(entities = self.entities.len(), "Tearing down scene");
        for (entity, adapter) in self.entities.query_mut::<&mut PhysicsEntity>() {
            if let Err(err) = adapter.detach(&mut self.physics) {
                warn!(?entity, %err, "Failed to detach physics entity");
            }
        }
        self.physics.shutdown();
        self.entities.clear();
    }
}
