//! Ray–sphere intersection (spec §4.2): closed-form quadratic solve with
//! inside/outside classification and a fixed self-hit guard.

use crate::raytracer::vector::{Direction, Position, SELF_HIT_EPSILON};
use crate::raytracer::world::Sphere;

/// Result of intersecting a ray with one sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub distance: f64,
    pub point: Position,
    /// `-1.0` if the ray originated inside the sphere, `1.0` otherwise —
    /// multiplied onto the surface normal by the caller.
    pub flip: f64,
}

/// Sentinel returned by callers that want a "no hit" distance rather than an
/// `Option` (the renderer's per-sphere pass needs a distance to compare
/// against a running minimum across all 512 slots, including empty ones).
pub const NO_HIT: f64 = -1.0;

/// Solve `t^2 + 2(D.(O-C))t + (|O-C|^2 - r^2) = 0` for the nearest valid hit.
///
/// Returns `None` on a miss: non-positive discriminant, both roots
/// non-positive, or the chosen root at or below the fixed self-intersection
/// threshold of `0.01` (independent of the scene's configurable `eps`).
pub fn intersect_sphere(origin: &Position, dir: &Direction, sphere: &Sphere) -> Option<Hit> {
    let oc = *origin.as_ref() - *sphere.centre().as_ref();

    let b = 2. * dir.as_ref().dot(&oc);
    let c = oc.dot(&oc) - sphere.radius().powi(2);

    let discriminant = b * b - 4. * c;
    if discriminant <= 0. {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / 2.;
    let t2 = (-b + sqrt_disc) / 2.;

    let t = if t1 > 0. { t1 } else { t2 };
    if t <= SELF_HIT_EPSILON {
        return None;
    }

    let point = origin.move_along(t, dir);

    let midpoint = origin.move_along(t / 2., dir);
    let inside = midpoint.distance_to(sphere.centre()).powi(2) < sphere.radius().powi(2);
    let flip = if inside { -1.0 } else { 1.0 };

    Some(Hit {
        distance: t,
        point,
        flip,
    })
}
