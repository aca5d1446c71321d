//! Blinn-Phong sphere ray tracer: vector kernel, intersector, shader,
//! renderer and the scene registry that drives them.

pub mod error;
pub mod intersect;
pub mod render;
pub mod shader;
pub mod vector;
pub mod world;

pub use error::{RenderError, Result};
pub use vector::{Color, Direction, Position};
pub use world::{Camera, Entity, EntityRef, Frame, FrameHistory, Light, Scene, Sphere};

pub mod prelude {
    pub use super::{
        vector::{Color, Direction, Position},
        world::{Camera, Entity, EntityRef, Frame, FrameHistory, Light, Scene, Sphere},
        RenderError, Result,
    };
}
