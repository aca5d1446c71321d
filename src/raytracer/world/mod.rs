pub mod camera;
pub mod entity;
pub mod frame;
pub mod objects;
pub mod scene;
pub mod serialize;
pub mod validate;

pub use camera::Camera;
pub use entity::{Entity, EntityRef};
pub use frame::{Frame, FrameHistory};
pub use objects::{Light, Sphere};
pub use scene::Scene;
