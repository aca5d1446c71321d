//! Shared scalar/vector validation helpers used by every entity constructor.

use crate::raytracer::error::ValidationError;
use crate::raytracer::vector::{Color, Direction};

pub const RESERVED_NAMES: [&str; 2] = ["_camera", "_light"];

pub fn channel(field: &'static str, color: &Color) -> Result<(), ValidationError> {
    for (value, suffix) in [(color.r(), "_r"), (color.g(), "_g"), (color.b(), "_b")] {
        if !(0. ..=1.).contains(&value) {
            return Err(ValidationError::ChannelOutOfRange {
                field: leak_concat(field, suffix),
                value,
            });
        }
    }
    Ok(())
}

pub fn range(field: &'static str, value: f64, low: f64, high: f64) -> Result<(), ValidationError> {
    if (low..=high).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            low,
            high,
        })
    }
}

pub fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0. {
        Ok(())
    } else if field == "radius" {
        Err(ValidationError::NonPositiveRadius(value))
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            low: 0.,
            high: f64::INFINITY,
        })
    }
}

pub fn non_zero_direction(field: &'static str, dir: &Direction) -> Result<(), ValidationError> {
    if dir.as_ref().magnitude_squared() == 0. {
        Err(ValidationError::ZeroVector { field })
    } else {
        Ok(())
    }
}

pub fn sphere_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(ValidationError::ReservedName(name.to_string()));
    }
    Ok(())
}

/// `ValidationError::ChannelOutOfRange` wants a `&'static str`; channel
/// suffixes are drawn from a fixed set, so a tiny static table avoids
/// allocating a `String` just to name which component failed.
fn leak_concat(field: &'static str, suffix: &'static str) -> &'static str {
    match (field, suffix) {
        ("ambient", "_r") => "ambient_r",
        ("ambient", "_g") => "ambient_g",
        ("ambient", "_b") => "ambient_b",
        ("diffuse", "_r") => "diffuse_r",
        ("diffuse", "_g") => "diffuse_g",
        ("diffuse", "_b") => "diffuse_b",
        ("specular", "_r") => "specular_r",
        ("specular", "_g") => "specular_g",
        ("specular", "_b") => "specular_b",
        ("background", "_r") => "background_r",
        ("background", "_g") => "background_g",
        ("background", "_b") => "background_b",
        _ => field,
    }
}
