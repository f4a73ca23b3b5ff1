//! Configuration types for the physics world

use crate::error::{PhysicsError, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Broad phase algorithm used to find candidate pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BroadPhaseKind {
    /// Sort bounding boxes along the axis of highest variance
    #[default]
    SweepAndPrune,
    /// Test every pair, O(n²)
    BruteForce,
}

/// Stepping policy and solver tunables for a physics world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration applied to dynamic bodies
    pub gravity: Vec2,
    /// Fixed simulation timestep in seconds
    pub fixed_timestep: f32,
    /// Maximum steps per `advance` call; excess time is dropped
    pub max_substeps: u32,
    /// Fraction of penetration removed per step, in (0, 1]
    pub position_correction: f32,
    /// Penetration allowed before positional correction kicks in
    pub penetration_slop: f32,
    /// Closing speed below which contacts with a static or kinematic body are inelastic
    pub restitution_threshold: f32,
    /// Generate pairs between two kinematic bodies
    pub kinematic_pairs: bool,
    /// Broad phase algorithm
    pub broad_phase: BroadPhaseKind,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 8,
            position_correction: 0.8,
            penetration_slop: 0.005,
            restitution_threshold: 0.5,
            kinematic_pairs: false,
            broad_phase: BroadPhaseKind::SweepAndPrune,
        }
    }
}

impl PhysicsConfig {
    /// Create a config with the given stepping policy and default tunables
    pub fn new(gravity: Vec2, fixed_timestep: f32, max_substeps: u32) -> Self {
        Self {
            gravity,
            fixed_timestep,
            max_substeps,
            ..Default::default()
        }
    }

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PhysicsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = ?path, "Loading physics config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that every value is usable by the stepping loop
    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidConfig(
                "max_substeps must be at least 1".to_string(),
            ));
        }
        if !(self.position_correction > 0.0 && self.position_correction <= 1.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "position_correction must be in (0, 1], got {}",
                self.position_correction
            )));
        }
        if !(self.penetration_slop.is_finite() && self.penetration_slop >= 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "penetration_slop must be non-negative, got {}",
                self.penetration_slop
            )));
        }
        if !(self.restitution_threshold.is_finite() && self.restitution_threshold >= 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "restitution_threshold must be non-negative, got {}",
                self.restitution_threshold
            )));
        }
        Ok(())
    }
}
