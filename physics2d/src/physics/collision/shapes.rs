//! Collision shapes and their bounding boxes

use super::Aabb;
use crate::error::{PhysicsError, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision shape types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Circle with radius
    Circle { radius: f32 },
    /// Box with half-extents (width/2, height/2), rotated by the body angle
    Box { half_extents: Vec2 },
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Box {
            half_extents: Vec2::splat(0.5),
        }
    }
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    pub fn cuboid(half_width: f32, half_height: f32) -> Self {
        Shape::Box {
            half_extents: Vec2::new(half_width, half_height),
        }
    }

    /// Reject non-positive or non-finite dimensions
    pub fn validate(&self) -> Result<()> {
        match self {
            Shape::Circle { radius } => {
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err(PhysicsError::InvalidBodySpec(format!(
                        "circle radius must be positive, got {radius}"
                    )));
                }
            }
            Shape::Box { half_extents } => {
                if !(half_extents.is_finite() && half_extents.min_element() > 0.0) {
                    return Err(PhysicsError::InvalidBodySpec(format!(
                        "box half extents must be positive, got {half_extents:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Get the AABB for this shape transformed by position and rotation
    pub fn world_aabb(&self, position: Vec2, rotation: f32) -> Aabb {
        match self {
            // Circles are rotation-invariant
            Shape::Circle { radius } => Aabb::from_center_half_extents(position, Vec2::splat(*radius)),
            Shape::Box { half_extents } => {
                let rot = Vec2::from_angle(rotation);
                let corners = [
                    Vec2::new(-half_extents.x, -half_extents.y),
                    Vec2::new(half_extents.x, -half_extents.y),
                    Vec2::new(-half_extents.x, half_extents.y),
                    Vec2::new(half_extents.x, half_extents.y),
                ];

                let mut aabb = Aabb::new(Vec2::splat(f32::MAX), Vec2::splat(f32::MIN));
                for corner in corners {
                    aabb.expand_to_include(position + rot.rotate(corner));
                }
                aabb
            }
        }
    }

    /// Area of the shape
    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            Shape::Box { half_extents } => 4.0 * half_extents.x * half_extents.y,
        }
    }
}
