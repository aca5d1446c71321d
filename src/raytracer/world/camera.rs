use crate::raytracer::error::ValidationError;
use crate::raytracer::vector::{Color, Direction, Position};
use crate::raytracer::world::validate;

pub const CAMERA_NAME: &str = "_camera";

/// Maximum allowed deviation from orthogonality between `cam_to_screen` and
/// `screen_north`, per spec §3.
const ORTHOGONALITY_TOLERANCE: f64 = 5e-6;

/// The scene's single pinhole camera (spec §3, §4.5). Fixed name `_camera`;
/// resolution is immutable once the camera is registered (enforced by the
/// scene, not here — a standalone `Camera` has no notion of "already
/// registered").
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    position: Position,
    height: u32,
    width: u32,
    cam_to_screen: Direction,
    screen_north: Direction,
    background: Color,
}

impl Camera {
    pub fn new(
        position: Position,
        height: u32,
        width: u32,
        cam_to_screen: Direction,
        screen_north: Direction,
        background: Color,
    ) -> Result<Self, ValidationError> {
        if height == 0 || width == 0 {
            return Err(ValidationError::NonPositiveResolution { height, width });
        }
        validate::non_zero_direction("cam_to_screen", &cam_to_screen)?;
        validate::non_zero_direction("screen_north", &screen_north)?;
        validate::channel("background", &background)?;

        let dot = cam_to_screen.dot(&screen_north);
        if dot.abs() >= ORTHOGONALITY_TOLERANCE {
            return Err(ValidationError::NonOrthogonalScreenVectors { dot });
        }

        Ok(Self {
            position,
            height,
            width,
            cam_to_screen,
            screen_north,
            background,
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// `East = F x Nn`.
    pub fn east(&self) -> Direction {
        self.cam_to_screen.cross(&self.screen_north)
    }

    /// `S = C + F`.
    pub fn screen_centre(&self) -> Position {
        self.position.move_along(1.0, &self.cam_to_screen)
    }

    /// The world-space centre of pixel `(row, col)`, `row in [0,height)`,
    /// `col in [0,width)` (spec §4.5). Pixels are square because the
    /// vertical term is divided by `width`, not `height`.
    pub fn pixel_centre(&self, row: u32, col: u32) -> Position {
        let (h, w) = (self.height as f64, self.width as f64);
        let (i, j) = (row as f64, col as f64);

        let east = self.east();
        let horiz = (2. * j - w + 1.) / w;
        let vert = (h - 1. - 2. * i) / w;

        self.screen_centre()
            .move_along(0.5 * horiz, &east)
            .move_along(0.5 * vert, &self.screen_north)
    }

    /// The primary ray direction through pixel `(row, col)`.
    pub fn primary_ray_direction(&self, row: u32, col: u32) -> Direction {
        Direction::a_to_b(&self.position, &self.pixel_centre(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn camera(h: u32, w: u32) -> Camera {
        Camera::new(
            Position::new(0., 0., 0.),
            h,
            w,
            Direction::new(0., 0., 1.),
            Direction::new(0., 1., 0.),
            Color::BLACK,
        )
        .unwrap()
    }

    #[test]
    fn rejects_zero_resolution() {
        let err = Camera::new(
            Position::new(0., 0., 0.),
            0,
            10,
            Direction::new(0., 0., 1.),
            Direction::new(0., 1., 0.),
            Color::BLACK,
        );
        assert!(matches!(
            err,
            Err(ValidationError::NonPositiveResolution { .. })
        ));
    }

    #[test]
    fn rejects_non_orthogonal_screen_vectors() {
        let err = Camera::new(
            Position::new(0., 0., 0.),
            10,
            10,
            Direction::new(0., 0., 1.),
            Direction::new(0.1, 1., 0.),
            Color::BLACK,
        );
        assert!(matches!(
            err,
            Err(ValidationError::NonOrthogonalScreenVectors { .. })
        ));
    }

    #[test]
    fn centre_pixel_ray_points_down_screen_normal() {
        let cam = camera(11, 11);
        // middle row/col for an odd resolution: vert term is 0, horiz term is 0.
        let dir = cam.primary_ray_direction(5, 5);
        assert_abs_diff_eq!(dir, Direction::new(0., 0., 1.), epsilon = 1e-9);
    }

    #[test]
    fn square_pixels_vertical_extent_is_h_over_w() {
        let cam = camera(20, 10);
        let top = cam.pixel_centre(0, 5);
        let bottom = cam.pixel_centre(19, 5);
        let vertical_extent = top.distance_to(&bottom);

        let left = cam.pixel_centre(10, 0);
        let right = cam.pixel_centre(10, 9);
        let horizontal_extent = left.distance_to(&right);

        // h/w = 2, and (h-1) steps vs (w-1) steps of equal per-pixel size.
        assert_abs_diff_eq!(vertical_extent / horizontal_extent, 19. / 9., epsilon = 1e-9);
    }
}
