use crate::raytracer::error::ValidationError;
use crate::raytracer::vector::{Color, Direction, Position};
use crate::raytracer::world::validate;

/// A sphere registered in a scene (spec §3). Immutable once built; the scene
/// replaces an entity wholesale rather than mutating through a reference
/// (REDESIGN FLAG "Dirty tracking through object mutation").
#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    name: String,
    centre: Position,
    radius: f64,
    ambient: Color,
    diffuse: Color,
    specular: Color,
    shine: f64,
    reflect: f64,
}

impl Sphere {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        centre: Position,
        radius: f64,
        ambient: Color,
        diffuse: Color,
        specular: Color,
        shine: f64,
        reflect: f64,
    ) -> Result<Self, ValidationError> {
        validate::sphere_name(&name)?;
        validate::positive("radius", radius)?;
        validate::channel("ambient", &ambient)?;
        validate::channel("diffuse", &diffuse)?;
        validate::channel("specular", &specular)?;
        validate::range("shine", shine, 0., 100.)?;
        validate::range("reflect", reflect, 0., 1.)?;

        Ok(Self {
            name,
            centre,
            radius,
            ambient,
            diffuse,
            specular,
            shine,
            reflect,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn centre(&self) -> &Position {
        &self.centre
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn diffuse(&self) -> Color {
        self.diffuse
    }

    pub fn specular(&self) -> Color {
        self.specular
    }

    pub fn shine(&self) -> f64 {
        self.shine
    }

    pub fn reflect(&self) -> f64 {
        self.reflect
    }

    /// Builds a sphere so large it reads as a flat plane through `point_on_surface`,
    /// spanned by `north`/`east`. The centre sits `radius` units from the
    /// reference point along `north x east`, so the point ends up on the
    /// near side of the sphere facing the camera that `north`/`east` were
    /// taken from. A convenience for ground planes and backdrops, not a
    /// distinct primitive — it's still a `Sphere` and intersects exactly
    /// like one.
    #[allow(clippy::too_many_arguments)]
    pub fn flat_surface(
        name: String,
        north: Direction,
        east: Direction,
        point_on_surface: Position,
        ambient: Color,
        diffuse: Color,
        specular: Color,
        radius: f64,
        shine: f64,
        reflect: f64,
    ) -> Result<Self, ValidationError> {
        let centre_direction = north.cross(&east);
        let centre = point_on_surface.move_along(radius, &centre_direction);
        Self::new(name, centre, radius, ambient, diffuse, specular, shine, reflect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_sphere(name: &str) -> Result<Sphere, ValidationError> {
        Sphere::new(
            name.to_string(),
            Position::new(0., 0., 0.),
            1.0,
            Color::new(0.1, 0.1, 0.1),
            Color::new(0.5, 0.5, 0.5),
            Color::new(1., 1., 1.),
            50.,
            0.3,
        )
    }

    #[test]
    fn rejects_non_positive_radius() {
        let err = Sphere::new(
            "s".into(),
            Position::new(0., 0., 0.),
            0.0,
            Color::BLACK,
            Color::BLACK,
            Color::BLACK,
            0.,
            0.,
        );
        assert!(matches!(err, Err(ValidationError::NonPositiveRadius(_))));
    }

    #[test]
    fn rejects_reserved_name() {
        assert!(ok_sphere("_camera").is_err());
        assert!(ok_sphere("_light").is_err());
    }

    #[test]
    fn accepts_valid_sphere() {
        assert!(ok_sphere("ball").is_ok());
    }

    #[test]
    fn flat_surface_places_the_centre_a_radius_away_along_the_cross_product() {
        let north = crate::raytracer::vector::Direction::new(0., 1., 0.);
        let east = crate::raytracer::vector::Direction::new(1., 0., 0.);
        let point_on_surface = Position::new(0., 0., 0.);

        let ground = Sphere::flat_surface(
            "ground".into(),
            north,
            east,
            point_on_surface,
            Color::new(0.1, 0.1, 0.1),
            Color::new(0.5, 0.5, 0.5),
            Color::BLACK,
            1000.0,
            45.,
            0.1,
        )
        .unwrap();

        // north x east = (0,1,0) x (1,0,0) = (0,0,-1); the reference point
        // sits on the sphere's surface in that direction from the centre.
        assert_eq!(ground.radius(), 1000.0);
        assert!((ground.centre().distance_to(&point_on_surface) - 1000.0).abs() < 1e-6);
    }
}
