//! Impulse-based contact resolution
//!
//! A single sequential pass per step: one normal impulse with restitution,
//! one clamped friction impulse, then positional correction along the
//! normal to remove penetration that velocity changes alone would leave.

use crate::config::PhysicsConfig;
use crate::physics::body::Body;
use crate::physics::collision::ContactManifold;
use tracing::trace;

/// Tunables the solver reads from the world config
#[derive(Debug, Clone, Copy)]
pub struct SolverSettings {
    /// Fraction of penetration removed per step, at most 1.0
    pub position_correction: f32,
    /// Penetration left uncorrected to avoid jitter
    pub penetration_slop: f32,
    /// Slower impacts against a static or kinematic body do not bounce
    pub restitution_threshold: f32,
}

impl From<&PhysicsConfig> for SolverSettings {
    fn from(config: &PhysicsConfig) -> Self {
        Self {
            position_correction: config.position_correction.min(1.0),
            penetration_slop: config.penetration_slop,
            restitution_threshold: config.restitution_threshold,
        }
    }
}

/// Combined restitution of a pair: the bouncier body wins
pub fn combined_restitution(a: f32, b: f32) -> f32 {
    a.max(b)
}

/// Combined friction of a pair: geometric mean
pub fn combined_friction(a: f32, b: f32) -> f32 {
    (a * b).sqrt()
}

/// What the solver did for one contact
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactResponse {
    pub normal_impulse: f32,
    pub friction_impulse: f32,
    pub correction: f32,
}

/// Resolve a contact between A and B; the manifold normal points from A to B
///
/// Bodies with zero inverse mass receive no velocity or position change.
pub fn resolve_contact(
    a: &mut Body,
    b: &mut Body,
    manifold: &ContactManifold,
    settings: &SolverSettings,
) -> ContactResponse {
    let inv_mass_a = a.inverse_mass;
    let inv_mass_b = b.inverse_mass;
    let total_inv_mass = inv_mass_a + inv_mass_b;

    let mut response = ContactResponse::default();
    if total_inv_mass <= 0.0 {
        return response;
    }

    let normal = manifold.normal;
    let relative_velocity = b.linear_velocity - a.linear_velocity;
    let velocity_along_normal = relative_velocity.dot(normal);

    // Separating bodies get no impulse
    if velocity_along_normal <= 0.0 {
        // Only resting contact on an immovable body micro-bounces
        let against_immovable = inv_mass_a == 0.0 || inv_mass_b == 0.0;
        let restitution =
            if against_immovable && -velocity_along_normal < settings.restitution_threshold {
                0.0
            } else {
                combined_restitution(a.restitution, b.restitution)
            };
        let normal_impulse = -(1.0 + restitution) * velocity_along_normal / total_inv_mass;
        let impulse = normal * normal_impulse;
        a.linear_velocity -= impulse * inv_mass_a;
        b.linear_velocity += impulse * inv_mass_b;
        response.normal_impulse = normal_impulse;

        let relative_velocity = b.linear_velocity - a.linear_velocity;
        let tangent_speed = relative_velocity.dot(manifold.tangent());
        if tangent_speed.abs() > 1e-6 {
            let tangent = manifold.tangent() * tangent_speed.signum();
            let mu = combined_friction(a.friction, b.friction);
            let max_friction = mu * normal_impulse;
            let friction_impulse =
                (-relative_velocity.dot(tangent) / total_inv_mass).clamp(-max_friction, max_friction);
            let impulse = tangent * friction_impulse;
            a.linear_velocity -= impulse * inv_mass_a;
            b.linear_velocity += impulse * inv_mass_b;
            response.friction_impulse = friction_impulse;
        }
    }

    let correction = (manifold.penetration - settings.penetration_slop).max(0.0)
        * settings.position_correction
        / total_inv_mass;
    if correction > 0.0 {
        let push = normal * correction;
        a.pose.position -= push * inv_mass_a;
        b.pose.position += push * inv_mass_b;
        response.correction = correction;
    }

    trace!(
        normal_impulse = response.normal_impulse,
        friction_impulse = response.friction_impulse,
        penetration = manifold.penetration,
        "Resolved contact"
    );

    response
}
