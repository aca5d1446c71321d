//! A Blinn-Phong sphere ray tracer with a dirty-tracked scene graph and a
//! rayon-parallel renderer.
//!
//! ```no_run
//! use blinnphong::prelude::*;
//!
//! let mut scene = Scene::new();
//! scene.register(Camera::new(
//!     Position::new(0., 0., 5.),
//!     200,
//!     200,
//!     Direction::new(0., 0., -1.),
//!     Direction::new(0., 1., 0.),
//!     Color::new(0.02, 0.02, 0.02),
//! ).unwrap()).unwrap();
//! scene.register(Light::new(
//!     Position::new(5., 5., 5.),
//!     Color::new(0.1, 0.1, 0.1),
//!     Color::WHITE,
//!     Color::WHITE,
//!     10.0,
//! ).unwrap()).unwrap();
//! scene.register(Sphere::new(
//!     "ball".into(),
//!     Position::new(0., 0., 0.),
//!     1.0,
//!     Color::new(0.1, 0., 0.),
//!     Color::new(0.6, 0., 0.),
//!     Color::WHITE,
//!     40.,
//!     0.3,
//! ).unwrap()).unwrap();
//!
//! let frame = scene.capture_frame().unwrap();
//! assert_eq!(frame.resolution(), (200, 200));
//! ```

pub mod raytracer;

pub use raytracer::prelude;
pub use raytracer::{
    Camera, Color, Direction, Entity, EntityRef, Frame, FrameHistory, Light, Position,
    RenderError, Result, Scene, Sphere,
};
