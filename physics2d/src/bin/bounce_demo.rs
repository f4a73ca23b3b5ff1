//! Drop a few balls onto a floor and log the contact traffic

use physics2d::prelude::*;
use std::sync::{Arc, Mutex};
use tracing::info;

fn main() -> Result<()> {
    physics2d::init_logging();

    info!("=== Bounce Demo ===");

    let mut scene = Scene::new(PhysicsConfig::default())?;

    scene.spawn_body(
        BodyDesc::fixed(Shape::cuboid(10.0, 0.5)).with_position(Vec2::new(0.0, -0.5)),
    )?;
    let trigger = scene.spawn_body(
        BodyDesc::fixed(Shape::cuboid(1.0, 0.25))
            .with_position(Vec2::new(2.0, 1.0))
            .as_sensor(),
    )?;

    let mut balls = Vec::new();
    for i in 0..4 {
        let ball = scene.spawn_body(
            BodyDesc::dynamic(Shape::circle(0.3), 1.0)
                .with_position(Vec2::new(i as f32 * 1.2 - 1.0, 3.0 + i as f32))
                .with_restitution(0.2 + 0.2 * i as f32),
        )?;
        balls.push(ball);
    }

    let contacts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&contacts);
    scene.physics_mut().set_contact_callback(move |event| {
        if let Ok(mut events) = sink.lock() {
            events.push(*event);
        }
    });
    let overlaps = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&overlaps);
    scene.physics_mut().set_sensor_callback(move |event| {
        if event.is_begin() {
            if let Ok(mut count) = counter.lock() {
                *count += 1;
            }
        }
    });

    // Render frames at an uneven ~50 Hz against the 60 Hz simulation
    let mut steps = 0;
    for frame in 0..250 {
        let frame_time = if frame % 3 == 0 { 0.025 } else { 0.0175 };
        steps += scene.update(frame_time)?;

        let drained: Vec<ContactEvent> = match contacts.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(_) => Vec::new(),
        };
        for event in drained {
            let a = event.tag_a.and_then(|tag| scene.entity_for_tag(tag));
            let b = event.tag_b.and_then(|tag| scene.entity_for_tag(tag));
            info!(frame, phase = ?event.phase, ?a, ?b, "Contact");
        }
    }

    for ball in &balls {
        if let Some(transform) = scene.transform(*ball) {
            info!(entity = ?ball, position = ?transform.position, "Final ball pose");
        }
    }
    let sensor_hits = overlaps.lock().map(|count| *count).unwrap_or_default();
    info!(
        steps,
        sensor = ?trigger,
        sensor_hits,
        dropped = scene.physics().dropped_time(),
        "Demo finished"
    );

    scene.teardown();
    Ok(())
}
