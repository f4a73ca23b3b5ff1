//! Test that dropped bodies come to rest on static ground

use glam::Vec2;
use physics2d::config::PhysicsConfig;
use physics2d::physics::{BodyDesc, BodyId, PhysicsWorld, Shape};

fn world_with_ground() -> (PhysicsWorld, BodyId) {
    let _ = tracing_subscriber::fmt::try_init();

    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let ground = world
        .create_body(&BodyDesc::fixed(Shape::cuboid(10.0, 0.5)))
        .unwrap();
    (world, ground)
}

#[test]
fn test_circle_comes_to_rest() {
    let (mut world, ground) = world_with_ground();
    let ball = world
        .create_body(&BodyDesc::dynamic(Shape::circle(0.5), 1.0).with_position(Vec2::new(0.0, 2.0)))
        .unwrap();

    // Simulate for 5 seconds at 60 FPS
    for _ in 0..300 {
        world.advance(1.0 / 60.0).unwrap();
    }

    let slop = world.config().penetration_slop;
    let body = world.body(ball).unwrap();
    let penetration = 1.0 - body.position().y;
    assert!(
        penetration < slop * 2.0,
        "ball should rest on the ground, penetration {}",
        penetration
    );
    assert!(body.position().y < 1.0, "ball should stay in contact");
    assert!(
        body.linear_velocity().y.abs() < 1e-3,
        "ball should be at rest, vy {}",
        body.linear_velocity().y
    );
    assert!(world.is_touching(ground, ball));
}

#[test]
fn test_box_comes_to_rest() {
    let (mut world, ground) = world_with_ground();
    let crate_box = world
        .create_body(
            &BodyDesc::dynamic(Shape::cuboid(0.5, 0.5), 2.0)
                .with_position(Vec2::new(1.0, 3.0))
                .with_restitution(0.3),
        )
        .unwrap();

    for _ in 0..400 {
        world.advance(1.0 / 60.0).unwrap();
    }

    let body = world.body(crate_box).unwrap();
    assert!((body.position().y - 1.0).abs() < 0.02, "box at y {}", body.position().y);
    assert!((body.position().x - 1.0).abs() < 1e-4);
    assert!(body.linear_velocity().length() < 1e-3);
    assert_eq!(body.rotation(), 0.0);
    assert!(world.is_touching(ground, crate_box));
}

#[test]
fn test_bouncy_ball_loses_height_slowly() {
    let (mut world, _ground) = world_with_ground();
    let ball = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(0.5), 1.0)
                .with_position(Vec2::new(0.0, 5.0))
                .with_restitution(1.0),
        )
        .unwrap();

    let mut max_after_bounce: f32 = 0.0;
    let mut bounced = false;
    for _ in 0..240 {
        world.step().unwrap();
        let body = world.body(ball).unwrap();
        if body.linear_velocity().y > 0.0 {
            bounced = true;
        }
        if bounced {
            max_after_bounce = max_after_bounce.max(body.position().y);
        }
        assert!(body.position().y > 0.5, "ball tunneled to {}", body.position().y);
    }

    assert!(bounced);
    // A perfectly elastic bounce returns close to the drop height
    assert!(max_after_bounce > 4.0, "rebound peaked at {}", max_after_bounce);
}
