//! Batch stepping of independent worlds
//!
//! Worlds never share body storage, so a batch fans out over the rayon pool
//! and returns once every world has finished its `advance`. Results are in
//! input order.

use crate::error::Result;
use crate::physics::world::PhysicsWorld;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Advance every world by the same wall-clock delta, in parallel
pub fn advance_all(worlds: &mut [PhysicsWorld], wall_delta_time: f32) -> Vec<Result<u32>> {
    debug!(worlds = worlds.len(), wall_delta_time, "Advancing world batch");

    let results: Vec<Result<u32>> = worlds
        .par_iter_mut()
        .map(|world| world.advance(wall_delta_time))
        .collect();

    let failed = results.iter().filter(|result| result.is_err()).count();
    if failed > 0 {
        warn!(failed, "Some physics worlds failed to advance");
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyDesc;
    use crate::physics::collision::Shape;
    use glam::Vec2;

    #[test]
    fn test_batch_reports_each_world() {
        let mut worlds: Vec<PhysicsWorld> = (0..4)
            .map(|_| PhysicsWorld::configure(Vec2::new(0.0, -9.81), 1.0 / 60.0, 8).unwrap())
            .collect();
        for world in &mut worlds {
            world
                .create_body(&BodyDesc::dynamic(Shape::circle(0.5), 1.0))
                .unwrap();
        }
        worlds[2].shutdown();

        let results = advance_all(&mut worlds, 1.0 / 30.0);
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|result| matches!(result, Ok(2))));
        assert_eq!(worlds[0].step_count(), 2);
        assert_eq!(worlds[2].body_count(), 0);
    }
}
