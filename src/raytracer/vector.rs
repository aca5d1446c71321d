//! Fixed-width 3-component float primitives: the vector kernel.
//!
//! Positions, directions and colours are kept as distinct newtypes over
//! `nalgebra::Vector3<f64>` rather than one bare `Vec3`, so that e.g. adding
//! two camera positions or normalising a colour is a type error instead of a
//! silent bug. All operations here are pure and branch-free; nothing in this
//! module allocates or can fail.

use approx::{relative_eq, AbsDiffEq};
use nalgebra::Vector3;

use std::ops::{Add, Div, Mul, Sub};

/// Self-hit epsilon baked into the intersector (spec-fixed, not a scene
/// parameter — see `raytracer::intersect`).
pub const SELF_HIT_EPSILON: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position(Vector3<f64>);

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn move_along(&self, distance: f64, direction: &Direction) -> Self {
        Self::from(self.0 + distance * direction.0)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (other.0 - self.0).magnitude()
    }
}

impl From<Vector3<f64>> for Position {
    fn from(v: Vector3<f64>) -> Self {
        Self(v)
    }
}

impl AsRef<Vector3<f64>> for Position {
    fn as_ref(&self) -> &Vector3<f64> {
        &self.0
    }
}

impl Sub for Position {
    type Output = Direction;

    fn sub(self, rhs: Self) -> Direction {
        Direction::from(self.0 - rhs.0)
    }
}

impl AbsDiffEq for Position {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        1e-6
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        relative_eq!(self.0, other.0, epsilon = epsilon)
    }
}

/// A unit vector. `Direction::new`/`From<Vector3<f64>>` both normalise on
/// construction; `normalise(v)` for a zero `v` returns the zero vector
/// (the only `Direction` that is not actually unit length) rather than
/// faulting — matching the vector-kernel invariant in spec §4.1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Direction(Vector3<f64>);

impl Direction {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::from(Vector3::new(x, y, z))
    }

    pub const ZERO: Direction = Direction(Vector3::new(0.0, 0.0, 0.0));

    pub fn a_to_b(a: &Position, b: &Position) -> Self {
        Self::from(b.0 - a.0)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.0.dot(&other.0)
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::from(self.0.cross(&other.0))
    }

    pub fn reverse(&self) -> Self {
        Self::from(-self.0)
    }

    /// `d - 2(d.n)n`, `n` assumed unit.
    #[allow(non_snake_case)]
    pub fn reflect(&self, N: &Self) -> Self {
        let proj = self.0.dot(&N.0) * N.0;
        Self::from(self.0 - 2. * proj)
    }
}

impl AsRef<Vector3<f64>> for Direction {
    fn as_ref(&self) -> &Vector3<f64> {
        &self.0
    }
}

impl From<Vector3<f64>> for Direction {
    fn from(v: Vector3<f64>) -> Self {
        let mag = v.magnitude();
        if mag == 0. {
            Self(v)
        } else {
            Self(v / mag)
        }
    }
}

impl Add for Direction {
    type Output = Direction;

    fn add(self, rhs: Self) -> Direction {
        Direction::from(self.0 + rhs.0)
    }
}

impl AbsDiffEq for Direction {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        1e-6
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        relative_eq!(self.0, other.0, epsilon = epsilon)
    }
}

/// An RGB triple. Not assumed to be in `[0,1]` except where a caller states
/// so (material/light channels are validated at registration time, see
/// `world::scene`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color(Vector3<f64>);

impl From<Vector3<f64>> for Color {
    fn from(v: Vector3<f64>) -> Self {
        Self(v)
    }
}

impl AsRef<Vector3<f64>> for Color {
    fn as_ref(&self) -> &Vector3<f64> {
        &self.0
    }
}

impl Color {
    pub const BLACK: Color = Color(Vector3::new(0.0, 0.0, 0.0));
    pub const WHITE: Color = Color(Vector3::new(1.0, 1.0, 1.0));

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self(Vector3::new(r, g, b))
    }

    pub fn r(&self) -> f64 {
        self.0.x
    }

    pub fn g(&self) -> f64 {
        self.0.y
    }

    pub fn b(&self) -> f64 {
        self.0.z
    }

    pub fn channels(&self) -> [f32; 3] {
        [self.0.x as f32, self.0.y as f32, self.0.z as f32]
    }

    /// Element-wise (Hadamard) product — `a_s ⊙ a_l` and friends in the
    /// shader (spec §4.3).
    pub fn hadamard(&self, other: &Self) -> Self {
        Self(self.0.component_mul(&other.0))
    }

    pub fn clamp01(&self) -> Self {
        Self::new(
            self.0.x.clamp(0., 1.),
            self.0.y.clamp(0., 1.),
            self.0.z.clamp(0., 1.),
        )
    }

    pub fn in_unit_range(&self) -> bool {
        (0. ..=1.).contains(&self.0.x) && (0. ..=1.).contains(&self.0.y) && (0. ..=1.).contains(&self.0.z)
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from(self.0 + rhs.0)
    }
}

impl Mul<f64> for Color {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::from(self.0 * rhs)
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, rhs: Color) -> Self::Output {
        rhs * self
    }
}

impl Div<f64> for Color {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self::from(self.0 / rhs)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn finite_component() -> impl Strategy<Value = f64> {
        -100.0..100.0f64
    }

    fn nonzero_direction() -> impl Strategy<Value = Direction> {
        (finite_component(), finite_component(), finite_component())
            .prop_filter("zero vector normalises to zero, not a unit vector", |(x, y, z)| {
                x * x + y * y + z * z > 1e-6
            })
            .prop_map(|(x, y, z)| Direction::new(x, y, z))
    }

    proptest! {
        /// Reflecting any vector about a unit normal preserves its length,
        /// since reflection is an isometry.
        #[test]
        fn reflect_preserves_magnitude(d in nonzero_direction(), n in nonzero_direction()) {
            let reflected = d.reflect(&n);
            prop_assert!((reflected.as_ref().magnitude() - d.as_ref().magnitude()).abs() < 1e-5);
        }

        /// `clamp01` always lands every channel in [0,1], regardless of the
        /// input's range.
        #[test]
        fn clamp01_is_always_in_unit_range(r in -1000.0..1000.0f64, g in -1000.0..1000.0f64, b in -1000.0..1000.0f64) {
            let c = Color::new(r, g, b).clamp01();
            prop_assert!(c.in_unit_range());
        }

        /// `hadamard` is commutative, matching the scalar product it models.
        #[test]
        fn hadamard_is_commutative(r1 in 0.0..1.0f64, g1 in 0.0..1.0f64, b1 in 0.0..1.0f64, r2 in 0.0..1.0f64, g2 in 0.0..1.0f64, b2 in 0.0..1.0f64) {
            let a = Color::new(r1, g1, b1);
            let b = Color::new(r2, g2, b2);
            let ab = a.hadamard(&b);
            let ba = b.hadamard(&a);
            prop_assert!((ab.r() - ba.r()).abs() < 1e-9);
            prop_assert!((ab.g() - ba.g()).abs() < 1e-9);
            prop_assert!((ab.b() - ba.b()).abs() < 1e-9);
        }
    }
}
