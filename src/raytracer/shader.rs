//! Blinn–Phong one-bounce shading contribution (spec §4.3).

use crate::raytracer::vector::{Color, Direction};
use crate::raytracer::world::{Light, Sphere};

/// Inputs to one bounce's shading contribution, gathered by the renderer's
/// per-hit setup step (spec §4.4 step 4) before the shadow test runs.
#[allow(non_snake_case)]
pub struct ShadeInputs<'a> {
    pub reflectivity: f64,
    pub distance_to_light: f64,
    pub sphere: &'a Sphere,
    pub light: &'a Light,
    /// Unit vector toward the light.
    pub L: Direction,
    /// Unit vector toward the camera.
    pub V: Direction,
    /// Surface normal (already flip-corrected).
    pub N: Direction,
}

/// Compute this bounce's contribution, already attenuated by accumulated
/// reflectivity and light-distance falloff. Caller accumulates with
/// `Color::clamp01(prev + contribution)`.
///
/// The renderer's shadow test (spec §4.4 step 6) gates the whole call: when
/// the hit point can't see the light, this contribution isn't computed at
/// all (not even the ambient term) and `reflectivity` is simply carried
/// forward by the winning sphere's `reflect`.
#[allow(non_snake_case)]
pub fn shade(inputs: &ShadeInputs) -> Color {
    let ShadeInputs {
        reflectivity,
        distance_to_light: d,
        sphere,
        light,
        L,
        V,
        N,
    } = inputs;

    let ambient_term = sphere.ambient().hadamard(&light.ambient());

    // Direction's Add impl normalises on construction, so H is already unit.
    let H = *L + *V;

    let diffuse_term = sphere.diffuse().hadamard(&light.diffuse()) * N.dot(L);

    let spec_cos = N.dot(&H);
    // Intentional "back-face dimming": a negative cosine still contributes,
    // re-signed after the |.|^(shine/4) exponent, rather than being clamped
    // to zero as in textbook Blinn-Phong. Preserved from the source system.
    let spec_sign = if spec_cos >= 0. { 1.0 } else { -1.0 };
    let specular_term = sphere.specular().hadamard(&light.specular())
        * (spec_sign * spec_cos.abs().powf(sphere.shine() / 4.));

    let color = ambient_term + diffuse_term + specular_term;

    let i_sq = light.intensity() * light.intensity();
    let falloff = d.powi(2).min(i_sq) / d.powi(2);

    color * (reflectivity * falloff)
}
