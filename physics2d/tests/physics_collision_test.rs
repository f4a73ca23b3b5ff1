//! Tests for contact resolution between moving bodies

use glam::Vec2;
use physics2d::config::PhysicsConfig;
use physics2d::physics::{BodyDesc, ContactEvent, ContactPhase, PhysicsWorld, Shape};
use std::sync::{Arc, Mutex};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("physics2d=debug")
        .with_test_writer()
        .try_init();
}

fn recorded_contacts(world: &mut PhysicsWorld) -> Arc<Mutex<Vec<ContactEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    world.set_contact_callback(move |event| sink.lock().unwrap().push(*event));
    events
}

#[test]
fn test_head_on_elastic_collision_reverses_velocities() {
    init_tracing();

    let mut world = PhysicsWorld::configure(Vec2::ZERO, 1.0 / 60.0, 8).unwrap();
    let events = recorded_contacts(&mut world);

    let left = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 1.0)
                .with_position(Vec2::new(-1.5, 0.0))
                .with_velocity(Vec2::new(1.0, 0.0))
                .with_restitution(1.0),
        )
        .unwrap();
    let right = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 1.0)
                .with_position(Vec2::new(1.5, 0.0))
                .with_velocity(Vec2::new(-1.0, 0.0))
                .with_restitution(1.0),
        )
        .unwrap();

    let mut steps = 0;
    for _ in 0..120 {
        steps += world.advance(1.0 / 60.0).unwrap();
    }
    assert_eq!(steps, 120);

    let left_velocity = world.body(left).unwrap().linear_velocity();
    let right_velocity = world.body(right).unwrap().linear_velocity();
    assert!(
        (left_velocity - Vec2::new(-1.0, 0.0)).length() < 1e-4,
        "left should bounce back, got {:?}",
        left_velocity
    );
    assert!(
        (right_velocity - Vec2::new(1.0, 0.0)).length() < 1e-4,
        "right should bounce back, got {:?}",
        right_velocity
    );

    let events = events.lock().unwrap();
    let begins = events.iter().filter(|e| e.phase == ContactPhase::Begin).count();
    let ends = events.iter().filter(|e| e.phase == ContactPhase::End).count();
    assert_eq!(begins, 1);
    assert_eq!(ends, 1);

    let begin = events[0];
    assert_eq!((begin.body_a, begin.body_b), (left, right));
    let manifold = begin.manifold.unwrap();
    assert!((manifold.normal - Vec2::X).length() < 1e-5);
    assert!(manifold.point.x.abs() < 0.05);
}

#[test]
fn test_separating_overlap_keeps_velocities() {
    let mut world = PhysicsWorld::configure(Vec2::ZERO, 1.0 / 60.0, 8).unwrap();
    let a = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 2.0)
                .with_position(Vec2::new(-0.9, 0.0))
                .with_velocity(Vec2::new(-1.0, 0.0)),
        )
        .unwrap();
    let b = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 1.0)
                .with_position(Vec2::new(0.9, 0.0))
                .with_velocity(Vec2::new(2.0, 0.0)),
        )
        .unwrap();

    world.step().unwrap();

    // No pulling impulse; only positional correction separated them
    let body_a = world.body(a).unwrap();
    let body_b = world.body(b).unwrap();
    assert_eq!(body_a.linear_velocity(), Vec2::new(-1.0, 0.0));
    assert_eq!(body_b.linear_velocity(), Vec2::new(2.0, 0.0));

    let momentum =
        body_a.linear_velocity() * body_a.mass() + body_b.linear_velocity() * body_b.mass();
    assert_eq!(momentum, Vec2::ZERO);
    assert!(body_b.position().x - body_a.position().x > 1.8);
}

#[test]
fn test_momentum_conserved_in_inelastic_collision() {
    let mut world = PhysicsWorld::configure(Vec2::ZERO, 1.0 / 60.0, 8).unwrap();
    let heavy = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(0.5), 3.0)
                .with_position(Vec2::new(-2.0, 0.1))
                .with_velocity(Vec2::new(2.0, 0.0)),
        )
        .unwrap();
    let light = world
        .create_body(&BodyDesc::dynamic(Shape::cuboid(0.5, 0.5), 1.0).with_friction(0.0))
        .unwrap();

    let before = Vec2::new(6.0, 0.0);
    for _ in 0..90 {
        world.step().unwrap();
    }

    let heavy = world.body(heavy).unwrap();
    let light = world.body(light).unwrap();
    let after = heavy.linear_velocity() * heavy.mass() + light.linear_velocity() * light.mass();
    assert!((after - before).length() < 1e-3, "momentum drifted to {:?}", after);
    assert!(light.linear_velocity().x > 0.0);
}

#[test]
fn test_static_body_is_immovable() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let wall = world
        .create_body(&BodyDesc::fixed(Shape::cuboid(0.5, 5.0)).with_position(Vec2::new(3.0, 0.0)))
        .unwrap();
    let ball = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(0.5), 50.0)
                .with_velocity(Vec2::new(20.0, 0.0))
                .with_gravity_scale(0.0)
                .with_restitution(0.5),
        )
        .unwrap();

    world.apply_force(wall, Vec2::new(-1000.0, 0.0)).unwrap();
    world.apply_impulse(wall, Vec2::new(-1000.0, 0.0)).unwrap();
    world.set_velocity(wall, Vec2::new(5.0, 5.0), 1.0).unwrap();

    for _ in 0..60 {
        world.step().unwrap();
    }

    let wall = world.body(wall).unwrap();
    assert_eq!(wall.position(), Vec2::new(3.0, 0.0));
    assert_eq!(wall.rotation(), 0.0);
    assert_eq!(wall.linear_velocity(), Vec2::ZERO);
    assert_eq!(wall.inverse_mass(), 0.0);

    // Ball bounced off the wall
    assert!(world.body(ball).unwrap().linear_velocity().x < 0.0);
}

#[test]
fn test_kinematic_pushes_dynamic_and_ignores_kinematic() {
    let mut world = PhysicsWorld::configure(Vec2::ZERO, 1.0 / 60.0, 8).unwrap();
    let events = recorded_contacts(&mut world);

    let paddle = world
        .create_body(
            &BodyDesc::kinematic(Shape::cuboid(0.25, 1.0))
                .with_position(Vec2::new(-2.0, 0.0))
                .with_velocity(Vec2::new(3.0, 0.0)),
        )
        .unwrap();
    let ghost = world
        .create_body(
            &BodyDesc::kinematic(Shape::cuboid(0.25, 1.0)).with_position(Vec2::new(-1.0, 0.0)),
        )
        .unwrap();
    let ball = world
        .create_body(&BodyDesc::dynamic(Shape::circle(0.5), 1.0).with_position(Vec2::new(1.0, 0.0)))
        .unwrap();

    for _ in 0..60 {
        world.step().unwrap();
    }

    let paddle_body = world.body(paddle).unwrap();
    assert_eq!(paddle_body.linear_velocity(), Vec2::new(3.0, 0.0));
    assert!((paddle_body.position().x - 1.0).abs() < 1e-3);
    assert_eq!(world.body(ghost).unwrap().position(), Vec2::new(-1.0, 0.0));
    assert!(world.body(ball).unwrap().linear_velocity().x > 0.0);

    let events = events.lock().unwrap();
    assert!(events.iter().all(|e| e.other(paddle) != Some(ghost)));
    assert!(events.iter().any(|e| e.other(paddle) == Some(ball)));
}

#[test]
fn test_kinematic_pairs_when_enabled() {
    let config = PhysicsConfig {
        gravity: Vec2::ZERO,
        kinematic_pairs: true,
        ..PhysicsConfig::default()
    };
    let mut world = PhysicsWorld::new(config).unwrap();
    let a = world
        .create_body(&BodyDesc::kinematic(Shape::circle(1.0)))
        .unwrap();
    let b = world
        .create_body(&BodyDesc::kinematic(Shape::circle(1.0)).with_position(Vec2::new(1.0, 0.0)))
        .unwrap();

    world.step().unwrap();
    assert!(world.is_touching(a, b));
    // Neither has inverse mass, so neither moved
    assert_eq!(world.body(a).unwrap().position(), Vec2::ZERO);
    assert_eq!(world.body(b).unwrap().position(), Vec2::new(1.0, 0.0));
}

#[test]
fn test_layer_mask_filters_contacts() {
    let mut world = PhysicsWorld::configure(Vec2::ZERO, 1.0 / 60.0, 8).unwrap();
    let events = recorded_contacts(&mut world);

    let player = world
        .create_body(&BodyDesc::dynamic(Shape::circle(1.0), 1.0).with_filter(0b01, 0b10))
        .unwrap();
    let teammate = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 1.0)
                .with_position(Vec2::new(1.5, 0.0))
                .with_filter(0b01, 0b10),
        )
        .unwrap();
    let enemy = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 1.0)
                .with_position(Vec2::new(-1.5, 0.0))
                .with_filter(0b10, 0b01),
        )
        .unwrap();

    world.step().unwrap();

    assert!(!world.is_touching(player, teammate));
    assert!(world.is_touching(player, enemy));
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].other(player), Some(enemy));
}

#[test]
fn test_slow_elastic_collision_still_bounces() {
    let mut world = PhysicsWorld::configure(Vec2::ZERO, 1.0 / 60.0, 8).unwrap();
    let left = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 1.0)
                .with_position(Vec2::new(-1.5, 0.0))
                .with_velocity(Vec2::new(0.2, 0.0))
                .with_restitution(1.0),
        )
        .unwrap();
    let right = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 1.0)
                .with_position(Vec2::new(1.5, 0.0))
                .with_velocity(Vec2::new(-0.2, 0.0))
                .with_restitution(1.0),
        )
        .unwrap();

    for _ in 0..600 {
        world.step().unwrap();
    }

    let left_velocity = world.body(left).unwrap().linear_velocity();
    let right_velocity = world.body(right).unwrap().linear_velocity();
    assert!(
        (left_velocity - Vec2::new(-0.2, 0.0)).length() < 1e-4,
        "left should move away, got {:?}",
        left_velocity
    );
    assert!(
        (right_velocity - Vec2::new(0.2, 0.0)).length() < 1e-4,
        "right should move away, got {:?}",
        right_velocity
    );
    assert!(!world.is_touching(left, right));
}

#[test]
fn test_near_miss_keeps_velocities() {
    let mut world = PhysicsWorld::configure(Vec2::ZERO, 1.0 / 60.0, 8).unwrap();
    let events = recorded_contacts(&mut world);

    // Crossing paths that pass 2.47 apart at closest approach
    let runner = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 1.0)
                .with_position(Vec2::new(-5.0, 0.0))
                .with_velocity(Vec2::new(1.0, 0.0)),
        )
        .unwrap();
    let faller = world
        .create_body(
            &BodyDesc::dynamic(Shape::circle(1.0), 1.0)
                .with_position(Vec2::new(0.0, 8.5))
                .with_velocity(Vec2::new(0.0, -1.0)),
        )
        .unwrap();

    let mut bounds_overlapped = false;
    for _ in 0..600 {
        world.step().unwrap();
        let gap = world.body(runner).unwrap().position() - world.body(faller).unwrap().position();
        if gap.x.abs() < 2.0 && gap.y.abs() < 2.0 {
            bounds_overlapped = true;
        }
    }
    assert!(bounds_overlapped);

    assert_eq!(world.body(runner).unwrap().linear_velocity(), Vec2::new(1.0, 0.0));
    assert_eq!(world.body(faller).unwrap().linear_velocity(), Vec2::new(0.0, -1.0));
    assert!(events.lock().unwrap().is_empty());
}
