//! Broad phase collision detection using sweep and prune

use super::Aabb;
use crate::config::BroadPhaseKind;
use crate::physics::body::{BodyId, BodyType, CollisionFilter};
use std::cmp::Ordering;

/// Entry for broad phase collision detection
#[derive(Debug, Clone, Copy)]
pub struct BroadPhaseEntry {
    pub id: BodyId,
    pub aabb: Aabb,
    pub body_type: BodyType,
    pub filter: CollisionFilter,
}

/// Axis for sweep and prune
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Endpoint for sweep and prune
struct Endpoint {
    value: f32,
    index: usize,
    is_min: bool,
}

/// Find candidate pairs: overlapping boxes whose body types and filters allow contact
///
/// Pairs are canonical (lower id first), unique, and sorted.
pub fn find_pairs(
    entries: &[BroadPhaseEntry],
    kind: BroadPhaseKind,
    kinematic_pairs: bool,
) -> Vec<(BodyId, BodyId)> {
    let overlapping = match kind {
        BroadPhaseKind::SweepAndPrune => sweep_and_prune(entries),
        BroadPhaseKind::BruteForce => brute_force_pairs(entries),
    };

    let mut pairs: Vec<(BodyId, BodyId)> = overlapping
        .into_iter()
        .filter(|&(i, j)| can_pair(&entries[i], &entries[j], kinematic_pairs))
        .map(|(i, j)| canonical_pair(entries[i].id, entries[j].id))
        .collect();

    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

/// Order a pair so the lower id comes first
pub fn canonical_pair(a: BodyId, b: BodyId) -> (BodyId, BodyId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Body type and layer/mask rules for a pair
pub fn can_pair(a: &BroadPhaseEntry, b: &BroadPhaseEntry, kinematic_pairs: bool) -> bool {
    match (a.body_type, b.body_type) {
        // Static bodies cannot move into each other
        (BodyType::Static, BodyType::Static) => return false,
        (BodyType::Kinematic, BodyType::Kinematic) if !kinematic_pairs => return false,
        _ => {}
    }
    a.filter.interacts_with(&b.filter)
}

/// Perform broad phase collision detection using sweep and prune
///
/// Returns index pairs `(i, j)` with `i < j` whose boxes overlap.
pub fn sweep_and_prune(entries: &[BroadPhaseEntry]) -> Vec<(usize, usize)> {
    if entries.len() < 2 {
        return Vec::new();
    }

    let axis = determine_best_axis(entries);

    let mut endpoints = create_endpoints(entries, axis);
    // Min endpoints sort before max endpoints at equal values so touching boxes pair up
    endpoints.sort_by(|a, b| {
        a.value
            .partial_cmp(&b.value)
            .unwrap_or(Ordering::Equal)
            .then(b.is_min.cmp(&a.is_min))
    });

    let mut pairs = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    for endpoint in endpoints {
        if endpoint.is_min {
            for &active_index in &active {
                if entries[active_index].aabb.overlaps(&entries[endpoint.index].aabb) {
                    pairs.push((
                        active_index.min(endpoint.index),
                        active_index.max(endpoint.index),
                    ));
                }
            }
            active.push(endpoint.index);
        } else {
            active.retain(|&idx| idx != endpoint.index);
        }
    }

    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

/// Determine the best axis for sweep and prune based on variance
fn determine_best_axis(entries: &[BroadPhaseEntry]) -> Axis {
    let count = entries.len() as f32;
    let mean = entries
        .iter()
        .fold(glam::Vec2::ZERO, |acc, e| acc + e.aabb.center())
        / count;
    let variance = entries.iter().fold(glam::Vec2::ZERO, |acc, e| {
        let diff = e.aabb.center() - mean;
        acc + diff * diff
    }) / count;

    if variance.x >= variance.y {
        Axis::X
    } else {
        Axis::Y
    }
}

fn create_endpoints(entries: &[BroadPhaseEntry], axis: Axis) -> Vec<Endpoint> {
    let mut endpoints = Vec::with_capacity(entries.len() * 2);

    for (index, entry) in entries.iter().enumerate() {
        let (min_val, max_val) = match axis {
            Axis::X => (entry.aabb.min.x, entry.aabb.max.x),
            Axis::Y => (entry.aabb.min.y, entry.aabb.max.y),
        };

        endpoints.push(Endpoint {
            value: min_val,
            index,
            is_min: true,
        });
        endpoints.push(Endpoint {
            value: max_val,
            index,
            is_min: false,
        });
    }

    endpoints
}

/// Simple O(n²) broad phase for small numbers of objects
pub fn brute_force_pairs(entries: &[BroadPhaseEntry]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();

    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if entries[i].aabb.overlaps(&entries[j].aabb) {
                pairs.push((i, j));
            }
        }
    }

    pairs
}
