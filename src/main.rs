//! Thin demo binary: builds one scene, captures a frame, prints summary
//! statistics. No shading, intersection or dirty-tracking logic lives here —
//! that's all in the `blinnphong` library.

use anyhow::Context;
use blinnphong::prelude::*;

fn main() -> anyhow::Result<()> {
    let mut scene = Scene::new();

    scene
        .register(
            Camera::new(
                Position::new(0., 0., 6.),
                240,
                320,
                Direction::new(0., 0., -1.),
                Direction::new(0., 1., 0.),
                Color::new(0.02, 0.02, 0.05),
            )
            .context("building camera")?,
        )
        .context("registering camera")?;

    scene
        .register(
            Light::new(
                Position::new(6., 8., 6.),
                Color::new(0.15, 0.15, 0.15),
                Color::WHITE,
                Color::WHITE,
                12.0,
            )
            .context("building light")?,
        )
        .context("registering light")?;

    scene
        .register(
            Sphere::new(
                "centre".into(),
                Position::new(0., 0., 0.),
                1.5,
                Color::new(0.1, 0.0, 0.0),
                Color::new(0.6, 0.0, 0.0),
                Color::WHITE,
                40.,
                0.3,
            )
            .context("building centre sphere")?,
        )
        .context("registering centre sphere")?;

    scene
        .register(
            Sphere::new(
                "satellite".into(),
                Position::new(2.5, -0.5, 1.0),
                0.75,
                Color::new(0.0, 0.08, 0.02),
                Color::new(0.0, 0.5, 0.1),
                Color::new(0.8, 0.8, 0.8),
                20.,
                0.1,
            )
            .context("building satellite sphere")?,
        )
        .context("registering satellite sphere")?;

    let frame = scene.capture_frame().context("capturing frame")?;

    let (height, width) = frame.resolution();
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut sum = 0f64;
    let mut count = 0u64;

    for pixel in frame.pixels() {
        for channel in pixel {
            min = min.min(*channel);
            max = max.max(*channel);
            sum += *channel as f64;
            count += 1;
        }
    }

    println!("rendered {height}x{width} frame ({count} channel samples)");
    println!("channel min = {min:.4}, max = {max:.4}, mean = {:.4}", sum / count as f64);
    println!("frame history length = {}", scene.frames().len());

    Ok(())
}
