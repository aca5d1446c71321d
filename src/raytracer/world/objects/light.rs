use crate::raytracer::error::ValidationError;
use crate::raytracer::vector::{Color, Position};
use crate::raytracer::world::validate;

/// The scene's single point light (spec §3). Fixed name `_light`.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    position: Position,
    ambient: Color,
    diffuse: Color,
    specular: Color,
    intensity: f64,
}

pub const LIGHT_NAME: &str = "_light";

impl Light {
    pub fn new(
        position: Position,
        ambient: Color,
        diffuse: Color,
        specular: Color,
        intensity: f64,
    ) -> Result<Self, ValidationError> {
        validate::channel("ambient", &ambient)?;
        validate::channel("diffuse", &diffuse)?;
        validate::channel("specular", &specular)?;
        validate::positive("intensity", intensity)?;

        Ok(Self {
            position,
            ambient,
            diffuse,
            specular,
            intensity,
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
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

    pub fn intensity(&self) -> f64 {
        self.intensity
    }
}
