//! Narrow phase collision detection for generating contact manifolds

use super::{ContactManifold, Shape};
use crate::physics::body::Pose;
use glam::Vec2;

/// Test two posed shapes for overlap; the normal points from A to B
pub fn test_collision(
    shape_a: &Shape,
    pose_a: Pose,
    shape_b: &Shape,
    pose_b: Pose,
) -> Option<ContactManifold> {
    match (shape_a, shape_b) {
        (Shape::Circle { radius: radius_a }, Shape::Circle { radius: radius_b }) => {
            circle_circle_collision(pose_a.position, *radius_a, pose_b.position, *radius_b)
        }
        (Shape::Circle { radius }, Shape::Box { half_extents }) => {
            circle_box_collision(pose_a.position, *radius, pose_b, *half_extents)
        }
        (Shape::Box { half_extents }, Shape::Circle { radius }) => {
            circle_box_collision(pose_b.position, *radius, pose_a, *half_extents)
                .map(ContactManifold::flipped)
        }
        (Shape::Box { half_extents: extents_a }, Shape::Box { half_extents: extents_b }) => {
            box_box_collision(pose_a, *extents_a, pose_b, *extents_b)
        }
    }
}

/// Test collision between two circles
fn circle_circle_collision(
    pos_a: Vec2,
    radius_a: f32,
    pos_b: Vec2,
    radius_b: f32,
) -> Option<ContactManifold> {
    let delta = pos_b - pos_a;
    let distance_sq = delta.length_squared();
    let radius_sum = radius_a + radius_b;

    if distance_sq > radius_sum * radius_sum {
        return None;
    }

    let distance = distance_sq.sqrt();
    let normal = if distance > 0.0 {
        delta / distance
    } else {
        // Concentric circles, any direction separates them
        Vec2::Y
    };

    let penetration = radius_sum - distance;
    let point = pos_a + normal * (radius_a - penetration * 0.5);

    Some(ContactManifold::new(point, normal, penetration))
}

/// Test collision between a circle (A) and a box (B)
fn circle_box_collision(
    circle_pos: Vec2,
    radius: f32,
    box_pose: Pose,
    half_extents: Vec2,
) -> Option<ContactManifold> {
    let rot = Vec2::from_angle(box_pose.rotation);
    let inv_rot = Vec2::new(rot.x, -rot.y);

    // Circle center in the box's local space
    let local = inv_rot.rotate(circle_pos - box_pose.position);
    let closest = local.clamp(-half_extents, half_extents);

    let delta = local - closest;
    let distance_sq = delta.length_squared();

    if distance_sq > radius * radius {
        return None;
    }

    let distance = distance_sq.sqrt();
    // Local normal points from the box towards the circle
    let (local_normal, penetration) = if distance > 0.0 {
        (delta / distance, radius - distance)
    } else {
        // Center inside the box, push out through the nearest face
        let dx = half_extents.x - local.x.abs();
        let dy = half_extents.y - local.y.abs();
        if dx < dy {
            (Vec2::new(sign(local.x), 0.0), radius + dx)
        } else {
            (Vec2::new(0.0, sign(local.y)), radius + dy)
        }
    };

    let box_to_circle = rot.rotate(local_normal);
    // A is the circle, so the A-to-B normal points into the box
    let normal = -box_to_circle;
    let point = circle_pos + normal * radius;

    Some(ContactManifold::new(point, normal, penetration))
}

/// Test collision between two oriented boxes using the separating axis theorem
fn box_box_collision(
    pose_a: Pose,
    extents_a: Vec2,
    pose_b: Pose,
    extents_b: Vec2,
) -> Option<ContactManifold> {
    let axes_a = box_axes(pose_a.rotation);
    let axes_b = box_axes(pose_b.rotation);
    let center_delta = pose_b.position - pose_a.position;

    let mut min_penetration = f32::MAX;
    let mut best_axis = Vec2::ZERO;

    for axis in axes_a.iter().chain(axes_b.iter()) {
        let (penetration, flip) =
            test_separation_axis(*axis, center_delta, extents_a, extents_b, &axes_a, &axes_b)?;

        if penetration < min_penetration {
            min_penetration = penetration;
            best_axis = if flip { -*axis } else { *axis };
        }
    }

    let point = if pose_a.rotation == 0.0 && pose_b.rotation == 0.0 {
        overlap_center(pose_a, extents_a, pose_b, extents_b)
    } else {
        // Midpoint of the two deepest points lies inside the overlap region
        let support_a = box_support_point(pose_a.position, &axes_a, extents_a, best_axis);
        let support_b = box_support_point(pose_b.position, &axes_b, extents_b, -best_axis);
        (support_a + support_b) * 0.5
    };

    Some(ContactManifold::new(point, best_axis, min_penetration))
}

fn box_axes(rotation: f32) -> [Vec2; 2] {
    let rot = Vec2::from_angle(rotation);
    [rot, rot.perp()]
}

/// Returns the penetration along `axis` and whether B lies on its negative side
fn test_separation_axis(
    axis: Vec2,
    center_delta: Vec2,
    extents_a: Vec2,
    extents_b: Vec2,
    axes_a: &[Vec2; 2],
    axes_b: &[Vec2; 2],
) -> Option<(f32, bool)> {
    let separation = center_delta.dot(axis);

    let radius_a = extents_a.x * axes_a[0].dot(axis).abs() + extents_a.y * axes_a[1].dot(axis).abs();
    let radius_b = extents_b.x * axes_b[0].dot(axis).abs() + extents_b.y * axes_b[1].dot(axis).abs();

    let penetration = radius_a + radius_b - separation.abs();

    if penetration < 0.0 {
        None
    } else {
        Some((penetration, separation < 0.0))
    }
}

/// Get the support point of a box in a given direction
fn box_support_point(center: Vec2, axes: &[Vec2; 2], extents: Vec2, direction: Vec2) -> Vec2 {
    let mut support = center;
    for (axis, extent) in axes.iter().zip([extents.x, extents.y]) {
        if axis.dot(direction) > 0.0 {
            support += *axis * extent;
        } else {
            support -= *axis * extent;
        }
    }
    support
}

/// Center of the intersection of two axis-aligned boxes
fn overlap_center(pose_a: Pose, extents_a: Vec2, pose_b: Pose, extents_b: Vec2) -> Vec2 {
    let min = (pose_a.position - extents_a).max(pose_b.position - extents_b);
    let max = (pose_a.position + extents_a).min(pose_b.position + extents_b);
    (min + max) * 0.5
}

fn sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}
