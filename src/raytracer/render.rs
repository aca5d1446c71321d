//! The renderer kernel (spec §4.4): one pixel-parallel outer loop, each pixel
//! walking a fixed number of reflection bounces through a five-phase pass —
//! origin nudge, intersect-all, select-nearest + setup, shadow test, shading.

use indicatif::{ParallelProgressIterator, ProgressState, ProgressStyle};
use rayon::prelude::*;

use std::fmt::Write;

use crate::raytracer::intersect::{intersect_sphere, Hit};
use crate::raytracer::shader::{shade, ShadeInputs};
use crate::raytracer::vector::{Direction, Position};
use crate::raytracer::world::{Camera, Frame, Light, Sphere};

fn progress_bar_style() -> ProgressStyle {
    let text = [
        "[{bar:48.cyan/blue}] {percent}% {spinner:.green}",
        "Elapsed Time     : {elapsed_precise}",
        "ETA              : {eta}",
        "Tracing Progress : {pos}/{len} pixels",
        "Tracing Speed    : {per_sec}",
    ]
    .join("\n");

    ProgressStyle::with_template(&text)
        .unwrap()
        .with_key("per_sec", |state: &ProgressState, w: &mut dyn Write| {
            _ = write!(w, "{:.0} pixels/sec", state.per_sec());
        })
        .progress_chars("#>-")
}

/// Renders one frame. The outer loop is pixel-parallel (`rayon`); the inner
/// per-sphere phases of each bounce run sequentially — at up to 512 spheres
/// per scalar pass, nested work-stealing wouldn't pay for itself once the
/// outer fan-out already saturates the available cores.
pub fn render(camera: &Camera, light: &Light, spheres: &[Sphere], eps: f64, max_reflections: u32) -> Frame {
    let (height, width) = camera.resolution();
    let total = (height as u64) * (width as u64);

    let indices = 0..total;
    let pixels: Vec<[f32; 3]> = if cfg!(test) {
        indices
            .into_par_iter()
            .map(|idx| trace_pixel(camera, light, spheres, eps, max_reflections, idx, width))
            .collect()
    } else {
        indices
            .into_par_iter()
            .progress_with_style(progress_bar_style())
            .map(|idx| trace_pixel(camera, light, spheres, eps, max_reflections, idx, width))
            .collect()
    };

    Frame::new(height, width, pixels)
}

fn trace_pixel(
    camera: &Camera,
    light: &Light,
    spheres: &[Sphere],
    eps: f64,
    max_reflections: u32,
    idx: u64,
    width: u32,
) -> [f32; 3] {
    let row = (idx / width as u64) as u32;
    let col = (idx % width as u64) as u32;

    let mut origin = *camera.position();
    let mut direction = camera.primary_ray_direction(row, col);
    // P starts at the background colour (spec §4.4); a bounce that hits
    // nothing just breaks the loop and leaves whatever's accumulated so far.
    let mut accumulated = camera.background();
    let mut reflectivity = 1.0;

    // `b` ranges over `0..max_reflections` (spec §4.4: "bounce b = 0 to
    // max_reflections-1") — a budget of zero means the loop body never runs
    // and the pixel is exactly the background colour.
    for _ in 0..max_reflections {
        if reflectivity <= 0. {
            break;
        }

        // Phase 1: nudge the origin along the ray so the previous bounce's
        // own surface is never re-hit by the self-hit epsilon alone.
        let nudged_origin = origin.move_along(eps, &direction);

        // Phase 2+3: intersect every sphere, biasing each hit back toward
        // the surface by eps/10 (precision guard against dropouts), then
        // keep the lowest-distance hit, breaking exact ties by registration
        // order (spec §5: "lowest index wins"). `Iterator::min_by` returns
        // the *last* of equally-minimal elements, so a plain `min_by` here
        // would pick the highest index on a tie — fold manually instead.
        let nearest = spheres
            .iter()
            .enumerate()
            .filter_map(|(i, sphere)| {
                intersect_sphere(&nudged_origin, &direction, sphere).map(|hit| (i, bias_toward_surface(hit, &direction, eps)))
            })
            .fold(None, |best: Option<(usize, Hit)>, (i, hit)| match best {
                Some((_, b)) if hit.distance >= b.distance => best,
                _ => Some((i, hit)),
            });

        let Some((idx, hit)) = nearest else {
            break;
        };

        let sphere = &spheres[idx];
        let outward_normal = Direction::a_to_b(sphere.centre(), &hit.point);
        let normal = if hit.flip < 0. { outward_normal.reverse() } else { outward_normal };
        let view = direction.reverse();
        let to_light = Direction::a_to_b(&hit.point, light.position());
        let distance_to_light = hit.point.distance_to(light.position());

        // Phase 4: shadow test. Nudge along the surface normal (not toward
        // the light) and see whether any sphere (including others behind the
        // one just hit) sits strictly between the hit point and the light.
        let shadow_origin = hit.point.move_along(eps, &normal);
        let in_shadow = spheres
            .iter()
            .filter_map(|s| intersect_sphere(&shadow_origin, &to_light, s))
            .any(|shadow_hit| shadow_hit.distance < distance_to_light);

        // Phase 5: shading. An obstructed ray contributes nothing this
        // bounce (not even ambient) — spec §4.4 step 6 gates the whole
        // contribution on the obstruction count being zero.
        if !in_shadow {
            let contribution = shade(&ShadeInputs {
                reflectivity,
                distance_to_light,
                sphere,
                light,
                L: to_light,
                V: view,
                N: normal,
            });
            accumulated = (accumulated + contribution).clamp01();
        }

        reflectivity *= sphere.reflect();
        origin = hit.point;
        direction = direction.reflect(&normal);
    }

    [accumulated.r() as f32, accumulated.g() as f32, accumulated.b() as f32]
}

/// Pulls a hit back toward the surface by `eps/10` of its distance and
/// scales the distance down to match (spec §4.2's "Intersect-all" bias
/// against precision dropouts). Applied only to the per-bounce
/// nearest-selection pass, never to shadow-test intersections.
fn bias_toward_surface(hit: Hit, direction: &Direction, eps: f64) -> Hit {
    let shrink = eps / 10.;
    Hit {
        distance: hit.distance * (1. - shrink),
        point: hit.point.move_along(-shrink * hit.distance, direction),
        flip: hit.flip,
    }
}
