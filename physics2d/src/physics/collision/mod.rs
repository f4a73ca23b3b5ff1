//! Collision detection subsystem

pub mod broad_phase;
pub mod narrow_phase;
pub mod shapes;

use glam::Vec2;

pub use shapes::Shape;

/// Result of a precise overlap test between two shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactManifold {
    /// World space contact point
    pub point: Vec2,
    /// Unit normal pointing from A to B
    pub normal: Vec2,
    /// Penetration depth along the normal, never negative
    pub penetration: f32,
}

impl ContactManifold {
    pub fn new(point: Vec2, normal: Vec2, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }

    /// Flip the manifold (swap A and B)
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }

    /// Unit tangent for friction, perpendicular to the normal
    pub fn tangent(&self) -> Vec2 {
        self.normal.perp()
    }

    /// Minimum translation vector that separates the two shapes
    pub fn mtv(&self) -> Vec2 {
        self.normal * self.penetration
    }
}

/// Axis-aligned bounding box for broad phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create an AABB from a center point and half-extents
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Check if this AABB overlaps with another; touching edges count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Expand this AABB to include a point
    pub fn expand_to_include(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let aabb1 = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let aabb2 = Aabb::new(Vec2::splat(0.5), Vec2::splat(1.5));
        let aabb3 = Aabb::new(Vec2::splat(2.0), Vec2::splat(3.0));

        assert!(aabb1.overlaps(&aabb2));
        assert!(aabb2.overlaps(&aabb1));
        assert!(!aabb1.overlaps(&aabb3));
        assert!(!aabb3.overlaps(&aabb1));
    }

    #[test]
    fn test_touching_aabbs_overlap() {
        let left = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let right = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        assert!(left.overlaps(&right));
    }

    #[test]
    fn test_manifold_tangent_is_perpendicular() {
        let manifold = ContactManifold::new(Vec2::ZERO, Vec2::new(0.6, 0.8), 0.1);
        assert!(manifold.normal.dot(manifold.tangent()).abs() < 1e-6);
        assert!((manifold.tangent().length() - 1.0).abs() < 1e-6);

        let flipped = manifold.flipped();
        assert_eq!(flipped.normal, -manifold.normal);
        assert_eq!(flipped.penetration, manifold.penetration);
    }
}
